use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{
    domain::{Launch, LaunchId, Launchpad, LaunchpadId},
    error::FetchError,
};
use tokio::sync::{oneshot, Mutex};

use crate::api::LaunchCatalog;

type Reply<T> = oneshot::Receiver<Result<T, FetchError>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Page { page: u32, limit: u32 },
    Launch(LaunchId),
    Launchpad(LaunchpadId),
}

/// Catalog whose replies are queued up front, either ready or gated behind a
/// oneshot the test resolves later.
#[derive(Default)]
pub(crate) struct ScriptedCatalog {
    pages: Mutex<HashMap<u32, VecDeque<Reply<Vec<Launch>>>>>,
    launches: Mutex<HashMap<LaunchId, VecDeque<Reply<Launch>>>>,
    launchpads: Mutex<HashMap<LaunchpadId, VecDeque<Reply<Launchpad>>>>,
    calls: Mutex<Vec<Call>>,
}

fn ready<T>(result: Result<T, FetchError>) -> Reply<T> {
    let (tx, rx) = oneshot::channel();
    let _ = tx.send(result);
    rx
}

async fn take<K, T>(
    queues: &Mutex<HashMap<K, VecDeque<Reply<T>>>>,
    key: &K,
) -> Result<T, FetchError>
where
    K: std::hash::Hash + Eq,
{
    let reply = queues
        .lock()
        .await
        .get_mut(key)
        .and_then(VecDeque::pop_front);
    match reply {
        Some(rx) => rx
            .await
            .unwrap_or_else(|_| Err(FetchError::Network("reply dropped".to_string()))),
        None => Err(FetchError::Remote { status: 500 }),
    }
}

impl ScriptedCatalog {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) async fn push_page(&self, page: u32, result: Result<Vec<Launch>, FetchError>) {
        self.pages
            .lock()
            .await
            .entry(page)
            .or_default()
            .push_back(ready(result));
    }

    pub(crate) async fn gate_page(
        &self,
        page: u32,
    ) -> oneshot::Sender<Result<Vec<Launch>, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.pages.lock().await.entry(page).or_default().push_back(rx);
        tx
    }

    pub(crate) async fn push_launch(&self, id: &str, result: Result<Launch, FetchError>) {
        self.launches
            .lock()
            .await
            .entry(LaunchId::from(id))
            .or_default()
            .push_back(ready(result));
    }

    pub(crate) async fn gate_launch(&self, id: &str) -> oneshot::Sender<Result<Launch, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.launches
            .lock()
            .await
            .entry(LaunchId::from(id))
            .or_default()
            .push_back(rx);
        tx
    }

    pub(crate) async fn push_launchpad(&self, id: &str, result: Result<Launchpad, FetchError>) {
        self.launchpads
            .lock()
            .await
            .entry(LaunchpadId::from(id))
            .or_default()
            .push_back(ready(result));
    }

    pub(crate) async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl LaunchCatalog for ScriptedCatalog {
    async fn fetch_launch_page(&self, page: u32, limit: u32) -> Result<Vec<Launch>, FetchError> {
        self.calls.lock().await.push(Call::Page { page, limit });
        take(&self.pages, &page).await
    }

    async fn fetch_launch(&self, id: &LaunchId) -> Result<Launch, FetchError> {
        self.calls.lock().await.push(Call::Launch(id.clone()));
        take(&self.launches, id).await
    }

    async fn fetch_launchpad(&self, id: &LaunchpadId) -> Result<Launchpad, FetchError> {
        self.calls.lock().await.push(Call::Launchpad(id.clone()));
        take(&self.launchpads, id).await
    }
}

pub(crate) fn launch(id: &str, name: &str) -> Launch {
    Launch {
        id: LaunchId::from(id),
        name: name.to_string(),
        date_utc: Utc
            .with_ymd_and_hms(2020, 5, 30, 19, 22, 0)
            .single()
            .expect("valid timestamp"),
        success: Some(true),
        upcoming: false,
        launchpad: Some(LaunchpadId::from("pad-39a")),
        links: None,
    }
}

pub(crate) fn launches(prefix: &str, range: std::ops::RangeInclusive<u32>) -> Vec<Launch> {
    range
        .map(|n| launch(&format!("{prefix}{n}"), &format!("Mission {prefix}{n}")))
        .collect()
}

pub(crate) fn launchpad(id: &str) -> Launchpad {
    Launchpad {
        id: LaunchpadId::from(id),
        full_name: "Kennedy Space Center Historic Launch Complex 39A".to_string(),
        locality: "Cape Canaveral".to_string(),
        region: "Florida".to_string(),
        timezone: "America/New_York".to_string(),
        latitude: 28.6080585,
        longitude: -80.6039558,
        launch_attempts: 55,
        launch_successes: 54,
        images: None,
    }
}

pub(crate) fn ids(launches: &[Launch]) -> Vec<String> {
    launches.iter().map(|launch| launch.id.0.clone()).collect()
}
