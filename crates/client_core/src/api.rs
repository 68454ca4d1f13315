use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Launch, LaunchId, Launchpad, LaunchpadId},
    error::FetchError,
    protocol::{LaunchQuery, LaunchQueryResponse},
};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.spacexdata.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only access to the remote launch catalog. One attempt per call, no caching.
#[async_trait]
pub trait LaunchCatalog: Send + Sync {
    /// One page of launches, newest first. `page` is 1-based.
    async fn fetch_launch_page(&self, page: u32, limit: u32) -> Result<Vec<Launch>, FetchError>;
    async fn fetch_launch(&self, id: &LaunchId) -> Result<Launch, FetchError>;
    async fn fetch_launchpad(&self, id: &LaunchpadId) -> Result<Launchpad, FetchError>;
}

pub struct SpacexClient {
    http: Client,
    base_url: Url,
}

impl SpacexClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| FetchError::InvalidRequest(format!("bad base url {base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidRequest(format!(
                "base url {base_url} cannot carry a path"
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::InvalidRequest(format!("http client setup: {err}")))?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        lookup: Option<(&'static str, &str)>,
    ) -> Result<T, FetchError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some((entity, id)) = lookup {
                return Err(FetchError::NotFound {
                    entity,
                    id: id.to_string(),
                });
            }
        }
        if !status.is_success() {
            return Err(FetchError::Remote {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body).map_err(|err| FetchError::Decode(err.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Network("request timed out".to_string())
    } else {
        FetchError::Network(err.to_string())
    }
}

fn log_failure<T>(what: &str, result: Result<T, FetchError>) -> Result<T, FetchError> {
    if let Err(err) = &result {
        warn!(kind = ?err.kind(), "api: {what} failed: {err}");
    }
    result
}

#[async_trait]
impl LaunchCatalog for SpacexClient {
    async fn fetch_launch_page(&self, page: u32, limit: u32) -> Result<Vec<Launch>, FetchError> {
        if page == 0 || limit == 0 {
            return Err(FetchError::InvalidRequest(format!(
                "page and limit must be positive (page={page}, limit={limit})"
            )));
        }
        debug!(page, limit, "api: querying launch page");
        let request = self
            .http
            .post(self.endpoint(&["v5", "launches", "query"]))
            .json(&LaunchQuery::newest_first(page, limit));
        let result = self
            .execute::<LaunchQueryResponse>(request, None)
            .await
            .map(|response| response.docs);
        log_failure("launch page query", result)
    }

    async fn fetch_launch(&self, id: &LaunchId) -> Result<Launch, FetchError> {
        debug!(launch_id = %id, "api: fetching launch");
        let request = self
            .http
            .get(self.endpoint(&["v5", "launches", id.as_str()]));
        let result = self.execute(request, Some(("launch", id.as_str()))).await;
        log_failure("launch lookup", result)
    }

    async fn fetch_launchpad(&self, id: &LaunchpadId) -> Result<Launchpad, FetchError> {
        debug!(launchpad_id = %id, "api: fetching launchpad");
        let request = self
            .http
            .get(self.endpoint(&["v4", "launchpads", id.as_str()]));
        let result = self.execute(request, Some(("launchpad", id.as_str()))).await;
        log_failure("launchpad lookup", result)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
