pub mod api;
pub mod details;
pub mod geo;
pub mod launches;

pub use api::{LaunchCatalog, SpacexClient, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use details::{
    DetailFailure, DetailOutcome, DetailPhase, LaunchDetailController, LaunchDetailSnapshot,
};
pub use geo::{distance_to_launchpad_km, maps_links, GeoError, GeoPoint, MapsLinks};
pub use launches::{
    LaunchListController, LaunchListSnapshot, LoadOutcome, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
