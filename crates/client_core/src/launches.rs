//! Paginated launch list: merge, dedup, client-side search and the
//! refresh/load-more orchestration behind the list screen.
//!
//! Every fetch is stamped with the reset generation at dispatch. `initialize`
//! and `refresh` bump the generation, so any fetch dispatched before them is
//! discarded when it completes, whatever order the responses arrive in.

use std::{collections::HashSet, sync::Arc};

use shared::{
    domain::{Launch, LaunchId},
    error::{ErrorKind, FetchError},
};
use tokio::sync::{watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::api::LaunchCatalog;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// What happened to a single list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Committed,
    /// A newer reset superseded this fetch; its result was dropped.
    Stale,
    /// Another list fetch is in flight.
    Busy,
    /// The last page came back short; nothing was requested.
    Exhausted,
    Failed(ErrorKind),
}

/// Read model published to the view layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchListSnapshot {
    /// Held launches after the search filter is applied.
    pub launches: Arc<Vec<Launch>>,
    /// Size of the held collection before filtering.
    pub total: usize,
    pub loading: bool,
    pub refreshing: bool,
    pub loading_more: bool,
    pub error: Option<String>,
    /// Last successfully loaded page; 0 until the first page lands.
    pub page: u32,
    pub has_more: bool,
    pub search: String,
}

impl Default for LaunchListSnapshot {
    fn default() -> Self {
        Self {
            launches: Arc::default(),
            total: 0,
            loading: false,
            refreshing: false,
            loading_more: false,
            error: None,
            page: 0,
            has_more: true,
            search: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageTicket {
    generation: u64,
    page: u32,
}

struct FilterCache {
    revision: u64,
    needle: String,
    launches: Arc<Vec<Launch>>,
}

struct LaunchListState {
    launches: Arc<Vec<Launch>>,
    seen: HashSet<LaunchId>,
    /// Bumped whenever `launches` changes; keys the filter cache.
    revision: u64,
    page: u32,
    page_size: u32,
    search: String,
    initial_loading: bool,
    refreshing: bool,
    loading_more: bool,
    has_more: bool,
    error: Option<String>,
    generation: u64,
    reset_in_flight: Option<u64>,
    more_in_flight: Option<PageTicket>,
    filter_cache: Option<FilterCache>,
}

impl LaunchListState {
    fn new(page_size: u32) -> Self {
        Self {
            launches: Arc::default(),
            seen: HashSet::new(),
            revision: 0,
            page: 0,
            page_size,
            search: String::new(),
            initial_loading: false,
            refreshing: false,
            loading_more: false,
            has_more: true,
            error: None,
            generation: 0,
            reset_in_flight: None,
            more_in_flight: None,
            filter_cache: None,
        }
    }

    fn replace(&mut self, page: Vec<Launch>) {
        self.seen.clear();
        let mut launches = Vec::with_capacity(page.len());
        for launch in page {
            if self.seen.insert(launch.id.clone()) {
                launches.push(launch);
            }
        }
        self.launches = Arc::new(launches);
        self.revision += 1;
    }

    /// Appends unseen launches in page order; returns how many were new.
    fn append(&mut self, page: Vec<Launch>) -> usize {
        let fresh: Vec<Launch> = page
            .into_iter()
            .filter(|launch| self.seen.insert(launch.id.clone()))
            .collect();
        if fresh.is_empty() {
            return 0;
        }
        let added = fresh.len();
        Arc::make_mut(&mut self.launches).extend(fresh);
        self.revision += 1;
        added
    }

    fn filtered(&mut self) -> Arc<Vec<Launch>> {
        if self.search.is_empty() {
            return Arc::clone(&self.launches);
        }
        let needle = self.search.to_lowercase();
        if let Some(cache) = &self.filter_cache {
            if cache.revision == self.revision && cache.needle == needle {
                return Arc::clone(&cache.launches);
            }
        }
        let launches: Arc<Vec<Launch>> = Arc::new(
            self.launches
                .iter()
                .filter(|launch| launch.matches_search(&needle))
                .cloned()
                .collect(),
        );
        self.filter_cache = Some(FilterCache {
            revision: self.revision,
            needle,
            launches: Arc::clone(&launches),
        });
        launches
    }

    fn snapshot(&mut self) -> LaunchListSnapshot {
        LaunchListSnapshot {
            launches: self.filtered(),
            total: self.launches.len(),
            loading: self.initial_loading,
            refreshing: self.refreshing,
            loading_more: self.loading_more,
            error: self.error.clone(),
            page: self.page,
            has_more: self.has_more,
            search: self.search.clone(),
        }
    }
}

pub struct LaunchListController {
    catalog: Arc<dyn LaunchCatalog>,
    inner: Mutex<LaunchListState>,
    snapshots: watch::Sender<LaunchListSnapshot>,
}

impl LaunchListController {
    pub fn new(catalog: Arc<dyn LaunchCatalog>) -> Self {
        Self::with_page_size(catalog, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(catalog: Arc<dyn LaunchCatalog>, page_size: u32) -> Self {
        let (snapshots, _) = watch::channel(LaunchListSnapshot::default());
        Self {
            catalog,
            inner: Mutex::new(LaunchListState::new(page_size.clamp(1, MAX_PAGE_SIZE))),
            snapshots,
        }
    }

    pub fn snapshot(&self) -> LaunchListSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LaunchListSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn updates(&self) -> WatchStream<LaunchListSnapshot> {
        WatchStream::new(self.subscribe())
    }

    fn publish(&self, state: &mut LaunchListState) {
        self.snapshots.send_replace(state.snapshot());
    }

    /// Loads page 1 with the given page size, replacing anything held.
    pub async fn initialize(&self, page_size: u32) -> LoadOutcome {
        {
            let mut state = self.inner.lock().await;
            state.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        }
        self.reset(true).await
    }

    /// Re-fetches page 1 and replaces the held collection wholesale.
    pub async fn refresh(&self) -> LoadOutcome {
        self.reset(false).await
    }

    async fn reset(&self, initial: bool) -> LoadOutcome {
        let (generation, page_size) = {
            let mut state = self.inner.lock().await;
            state.generation += 1;
            let generation = state.generation;
            state.reset_in_flight = Some(generation);
            if initial {
                state.initial_loading = true;
            } else {
                state.refreshing = true;
            }
            if let Some(superseded) = state.more_in_flight.take() {
                debug!(page = superseded.page, "launches: load-more superseded by reset");
                state.loading_more = false;
            }
            self.publish(&mut state);
            (generation, state.page_size)
        };

        let result = self.catalog.fetch_launch_page(1, page_size).await;

        let mut state = self.inner.lock().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "launches: dropping stale page 1");
            return LoadOutcome::Stale;
        }
        state.reset_in_flight = None;
        state.initial_loading = false;
        state.refreshing = false;
        let outcome = match result {
            Ok(page) => {
                state.has_more = page.len() >= page_size as usize;
                state.replace(page);
                state.page = 1;
                state.error = None;
                info!(
                    generation,
                    held = state.launches.len(),
                    has_more = state.has_more,
                    "launches: page 1 committed"
                );
                LoadOutcome::Committed
            }
            Err(err) => record_failure(&mut state, 1, err),
        };
        self.publish(&mut state);
        outcome
    }

    /// Fetches the page after the cursor and appends unseen launches.
    pub async fn load_more(&self) -> LoadOutcome {
        let (ticket, page_size) = {
            let mut state = self.inner.lock().await;
            if state.reset_in_flight.is_some() || state.more_in_flight.is_some() {
                debug!("launches: load-more ignored, fetch already in flight");
                return LoadOutcome::Busy;
            }
            if !state.has_more {
                return LoadOutcome::Exhausted;
            }
            let ticket = PageTicket {
                generation: state.generation,
                page: state.page + 1,
            };
            state.more_in_flight = Some(ticket);
            state.loading_more = true;
            self.publish(&mut state);
            (ticket, state.page_size)
        };

        let result = self.catalog.fetch_launch_page(ticket.page, page_size).await;

        let mut state = self.inner.lock().await;
        if state.generation != ticket.generation || state.more_in_flight != Some(ticket) {
            debug!(page = ticket.page, "launches: dropping stale page");
            return LoadOutcome::Stale;
        }
        state.more_in_flight = None;
        state.loading_more = false;
        let outcome = match result {
            Ok(page) => {
                let received = page.len();
                state.has_more = received >= page_size as usize;
                let added = state.append(page);
                state.page = ticket.page;
                state.error = None;
                info!(
                    page = ticket.page,
                    received,
                    added,
                    has_more = state.has_more,
                    "launches: page committed"
                );
                LoadOutcome::Committed
            }
            Err(err) => record_failure(&mut state, ticket.page, err),
        };
        self.publish(&mut state);
        outcome
    }

    /// Filters the published view by name. Never touches the network.
    pub async fn set_search(&self, term: impl Into<String>) {
        let mut state = self.inner.lock().await;
        let term = term.into();
        if state.search == term {
            return;
        }
        state.search = term;
        self.publish(&mut state);
    }
}

fn record_failure(state: &mut LaunchListState, page: u32, err: FetchError) -> LoadOutcome {
    warn!(page, kind = ?err.kind(), "launches: page fetch failed: {err}");
    state.error = Some(err.to_string());
    LoadOutcome::Failed(err.kind())
}

#[cfg(test)]
#[path = "tests/launches_tests.rs"]
mod tests;
