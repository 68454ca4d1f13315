//! Distance to a launchpad and the external maps links behind "Open in Maps".

use shared::domain::Launchpad;
use thiserror::Error;
use url::Url;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("latitude must be between -90 and 90, got {0}")]
    Latitude(f64),
    #[error("longitude must be between -180 and 180, got {0}")]
    Longitude(f64),
    #[error("failed to build maps link: {0}")]
    Link(String),
}

/// WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle (haversine) distance in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

impl From<&Launchpad> for GeoPoint {
    fn from(launchpad: &Launchpad) -> Self {
        Self {
            latitude: launchpad.latitude,
            longitude: launchpad.longitude,
        }
    }
}

pub fn distance_to_launchpad_km(from: &GeoPoint, launchpad: &Launchpad) -> f64 {
    from.distance_km(&GeoPoint::from(launchpad))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsLinks {
    /// Apple Maps directions to the pad.
    pub apple: Url,
    /// Android `geo:` intent URI labelled with the pad name.
    pub android: Url,
}

pub fn maps_links(launchpad: &Launchpad) -> Result<MapsLinks, GeoError> {
    let coordinates = format!("{},{}", launchpad.latitude, launchpad.longitude);
    let apple = Url::parse_with_params("http://maps.apple.com/", &[("daddr", &coordinates)])
        .map_err(|err| GeoError::Link(err.to_string()))?;
    let mut android =
        Url::parse(&format!("geo:{coordinates}")).map_err(|err| GeoError::Link(err.to_string()))?;
    android
        .query_pairs_mut()
        .append_pair("q", &launchpad.full_name);
    Ok(MapsLinks { apple, android })
}

#[cfg(test)]
#[path = "tests/geo_tests.rs"]
mod tests;
