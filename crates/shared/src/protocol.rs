use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::Launch;

/// Field every collection page is populated with.
pub const PATCH_POPULATE_PATH: &str = "links.patch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSort {
    pub date_utc: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub sort: LaunchSort,
    pub limit: u32,
    pub page: u32,
    pub populate: Vec<String>,
}

/// Body of `POST /v5/launches/query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchQuery {
    pub query: Map<String, Value>,
    pub options: QueryOptions,
}

impl LaunchQuery {
    pub fn newest_first(page: u32, limit: u32) -> Self {
        Self {
            query: Map::new(),
            options: QueryOptions {
                sort: LaunchSort {
                    date_utc: SortOrder::Desc,
                },
                limit,
                page,
                populate: vec![PATCH_POPULATE_PATH.to_string()],
            },
        }
    }
}

/// Paginated envelope; only `docs` is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchQueryResponse {
    pub docs: Vec<Launch>,
}
