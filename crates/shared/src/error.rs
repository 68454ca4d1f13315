use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Remote,
    Decode,
    NotFound,
    InvalidRequest,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("remote service responded with status {status}")]
    Remote { status: u16 },
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error("{entity} {id} was not found")]
    NotFound { entity: &'static str, id: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network(_) => ErrorKind::Network,
            FetchError::Remote { .. } => ErrorKind::Remote,
            FetchError::Decode(_) => ErrorKind::Decode,
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }
}
