use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

/// Failure on the write path of a persisted collection.
///
/// Read paths never produce this: a missing or corrupt file degrades to the
/// backup or to an empty collection instead.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{op} failed for {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialize collection failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("lookup failed: {0}")]
    Upstream(#[from] anyhow::Error),
}

impl From<ApiError> for (StatusCode, String) {
    fn from(e: ApiError) -> Self {
        let status = match &e {
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, e.to_string())
    }
}
