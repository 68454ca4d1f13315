use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(LaunchId);
id_newtype!(LaunchpadId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchStatus {
    Upcoming,
    Success,
    Failure,
    Unknown,
}

impl LaunchStatus {
    pub fn label(self) -> &'static str {
        match self {
            LaunchStatus::Upcoming => "Upcoming",
            LaunchStatus::Success => "Success",
            LaunchStatus::Failure => "Failure",
            LaunchStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchLinks {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlickrLinks {
    #[serde(default)]
    pub original: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchLinks {
    #[serde(default)]
    pub patch: Option<PatchLinks>,
    #[serde(default)]
    pub flickr: Option<FlickrLinks>,
    #[serde(default)]
    pub webcast: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    pub id: LaunchId,
    pub name: String,
    pub date_utc: DateTime<Utc>,
    /// `None` while the launch is upcoming or its outcome is unresolved.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub upcoming: bool,
    #[serde(default)]
    pub launchpad: Option<LaunchpadId>,
    #[serde(default)]
    pub links: Option<LaunchLinks>,
}

impl Launch {
    pub fn status(&self) -> LaunchStatus {
        if self.upcoming {
            return LaunchStatus::Upcoming;
        }
        match self.success {
            Some(true) => LaunchStatus::Success,
            Some(false) => LaunchStatus::Failure,
            None => LaunchStatus::Unknown,
        }
    }

    /// First available image: flickr original, then patch large, then patch small.
    pub fn image_url(&self) -> Option<&str> {
        let links = self.links.as_ref()?;
        let flickr = links
            .flickr
            .as_ref()
            .and_then(|flickr| flickr.original.first())
            .map(String::as_str);
        let patch = links.patch.as_ref();
        flickr
            .or_else(|| patch.and_then(|patch| patch.large.as_deref()))
            .or_else(|| patch.and_then(|patch| patch.small.as_deref()))
    }

    pub fn matches_search(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.name.to_lowercase().contains(needle_lower)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchpadImages {
    #[serde(default)]
    pub large: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launchpad {
    pub id: LaunchpadId,
    pub full_name: String,
    pub locality: String,
    pub region: String,
    pub timezone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub launch_attempts: u32,
    pub launch_successes: u32,
    #[serde(default)]
    pub images: Option<LaunchpadImages>,
}

impl Launchpad {
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.locality, self.region)
    }

    /// Share of successful attempts in `[0, 1]`; `None` before the first attempt.
    pub fn success_rate(&self) -> Option<f64> {
        if self.launch_attempts == 0 {
            return None;
        }
        Some(f64::from(self.launch_successes) / f64::from(self.launch_attempts))
    }

    pub fn image_url(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|images| images.large.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
