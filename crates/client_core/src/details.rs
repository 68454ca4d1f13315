//! Single launch + launchpad loading for the detail screen.

use std::sync::Arc;

use shared::{
    domain::{Launch, LaunchId, Launchpad, LaunchpadId},
    error::{ErrorKind, FetchError},
};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::api::LaunchCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailPhase {
    #[default]
    Idle,
    LoadingLaunch,
    LoadingLaunchpad,
    Ready,
    Failed,
}

/// Which step of the sequence failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailFailure {
    Launch(ErrorKind),
    /// The launch itself loaded and stays visible.
    Launchpad(ErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
    Ready,
    Stale,
    Failed(DetailFailure),
    /// `refresh` was called before any `load`.
    NothingToRefresh,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchDetailSnapshot {
    pub launch_id: Option<LaunchId>,
    pub launch: Option<Launch>,
    pub launchpad: Option<Launchpad>,
    pub phase: DetailPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub failure: Option<DetailFailure>,
}

#[derive(Default)]
struct DetailState {
    generation: u64,
    view: LaunchDetailSnapshot,
}

pub struct LaunchDetailController {
    catalog: Arc<dyn LaunchCatalog>,
    inner: Mutex<DetailState>,
    snapshots: watch::Sender<LaunchDetailSnapshot>,
}

impl LaunchDetailController {
    pub fn new(catalog: Arc<dyn LaunchCatalog>) -> Self {
        let (snapshots, _) = watch::channel(LaunchDetailSnapshot::default());
        Self {
            catalog,
            inner: Mutex::new(DetailState::default()),
            snapshots,
        }
    }

    pub fn snapshot(&self) -> LaunchDetailSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LaunchDetailSnapshot> {
        self.snapshots.subscribe()
    }

    fn publish(&self, state: &DetailState) {
        self.snapshots.send_replace(state.view.clone());
    }

    /// Re-runs `load` for the last requested launch.
    pub async fn refresh(&self) -> DetailOutcome {
        let launch_id = self.inner.lock().await.view.launch_id.clone();
        match launch_id {
            Some(launch_id) => self.load(launch_id).await,
            None => DetailOutcome::NothingToRefresh,
        }
    }

    /// Fetches the launch, then its launchpad if it references one.
    pub async fn load(&self, launch_id: LaunchId) -> DetailOutcome {
        let generation = {
            let mut state = self.inner.lock().await;
            state.generation += 1;
            if state.view.launch_id.as_ref() != Some(&launch_id) {
                state.view = LaunchDetailSnapshot {
                    launch_id: Some(launch_id.clone()),
                    ..LaunchDetailSnapshot::default()
                };
            }
            state.view.phase = DetailPhase::LoadingLaunch;
            state.view.loading = true;
            self.publish(&state);
            state.generation
        };

        let launch = match self.catalog.fetch_launch(&launch_id).await {
            Ok(launch) => launch,
            Err(err) => {
                return self
                    .fail(generation, DetailFailure::Launch(err.kind()), err, None)
                    .await
            }
        };
        let launchpad_id = {
            let mut state = self.inner.lock().await;
            if state.generation != generation {
                debug!(launch_id = %launch_id, "details: dropping stale launch");
                return DetailOutcome::Stale;
            }
            let launchpad_id = launch.launchpad.clone();
            state.view.launch = Some(launch);
            let Some(launchpad_id) = launchpad_id else {
                state.view.launchpad = None;
                state.view.phase = DetailPhase::Ready;
                state.view.loading = false;
                state.view.error = None;
                state.view.failure = None;
                info!(launch_id = %launch_id, "details: launch ready without launchpad");
                self.publish(&state);
                return DetailOutcome::Ready;
            };
            state.view.phase = DetailPhase::LoadingLaunchpad;
            self.publish(&state);
            launchpad_id
        };

        match self.catalog.fetch_launchpad(&launchpad_id).await {
            Ok(launchpad) => {
                let mut state = self.inner.lock().await;
                if state.generation != generation {
                    debug!(launch_id = %launch_id, "details: dropping stale launchpad");
                    return DetailOutcome::Stale;
                }
                state.view.launchpad = Some(launchpad);
                state.view.phase = DetailPhase::Ready;
                state.view.loading = false;
                state.view.error = None;
                state.view.failure = None;
                info!(launch_id = %launch_id, launchpad_id = %launchpad_id, "details: ready");
                self.publish(&state);
                DetailOutcome::Ready
            }
            Err(err) => {
                self.fail(
                    generation,
                    DetailFailure::Launchpad(err.kind()),
                    err,
                    Some(&launchpad_id),
                )
                .await
            }
        }
    }

    async fn fail(
        &self,
        generation: u64,
        failure: DetailFailure,
        err: FetchError,
        launchpad_id: Option<&LaunchpadId>,
    ) -> DetailOutcome {
        let mut state = self.inner.lock().await;
        if state.generation != generation {
            return DetailOutcome::Stale;
        }
        warn!(?failure, "details: load failed: {err}");
        if let Some(launchpad_id) = launchpad_id {
            let held_matches = state
                .view
                .launchpad
                .as_ref()
                .is_some_and(|launchpad| &launchpad.id == launchpad_id);
            if !held_matches {
                state.view.launchpad = None;
            }
        }
        state.view.phase = DetailPhase::Failed;
        state.view.loading = false;
        state.view.error = Some(err.to_string());
        state.view.failure = Some(failure);
        self.publish(&state);
        DetailOutcome::Failed(failure)
    }
}

#[cfg(test)]
#[path = "tests/details_tests.rs"]
mod tests;
