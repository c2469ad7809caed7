//! Error types for the loader engine
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::scope::ScopeId;

// == Load Error Enum ==
/// Outcome error delivered to every waiter of a load.
///
/// Cloning is cheap: collaborator errors are shared behind an `Arc`, so all
/// waiters of one failed batch observe the same underlying error instance.
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    /// The collaborator reported a failure for this key only
    #[error("Failed to resolve key {key}: {cause}")]
    KeyResolution {
        key: String,
        cause: Arc<anyhow::Error>,
    },

    /// The whole bulk fetch failed
    #[error("Batch fetch failed: {0}")]
    BatchFetch(Arc<anyhow::Error>),

    /// The owning scope was torn down before the load resolved
    #[error("Scope {0} is closed")]
    ScopeClosed(ScopeId),

    /// The batch exceeded its configured deadline
    #[error("Batch of {keys} keys timed out after {}ms", .after.as_millis())]
    Timeout { keys: usize, after: Duration },

    /// Invalid engine options
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl LoadError {
    pub(crate) fn key_resolution(key: impl std::fmt::Debug, cause: anyhow::Error) -> Self {
        LoadError::KeyResolution {
            key: format!("{:?}", key),
            cause: Arc::new(cause),
        }
    }

    /// True for failures that affect a whole batch rather than a single key.
    pub fn is_batch_level(&self) -> bool {
        matches!(
            self,
            LoadError::BatchFetch(_) | LoadError::Timeout { .. } | LoadError::ScopeClosed(_)
        )
    }
}

// == Result Type Alias ==
/// Convenience Result type for the loader engine.
pub type Result<T> = std::result::Result<T, LoadError>;

// == API Error Enum ==
/// Errors surfaced by the demo HTTP server.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Engine failure outside of per-key outcomes
    #[error(transparent)]
    Load(#[from] LoadError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Load(LoadError::KeyResolution { .. }) => StatusCode::NOT_FOUND,
            ApiError::Load(LoadError::BatchFetch(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Load(LoadError::ScopeClosed(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Load(LoadError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Load(LoadError::Configuration(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_in_millis() {
        let err = LoadError::Timeout {
            keys: 3,
            after: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Batch of 3 keys timed out after 250ms");
    }

    #[test]
    fn test_key_resolution_formats_key_with_debug() {
        let err = LoadError::key_resolution("user-7", anyhow::anyhow!("missing row"));
        assert_eq!(
            err.to_string(),
            "Failed to resolve key \"user-7\": missing row"
        );
        assert!(!err.is_batch_level());
    }

    #[test]
    fn test_clone_shares_batch_error() {
        let err = LoadError::BatchFetch(Arc::new(anyhow::anyhow!("connection reset")));
        let copy = err.clone();
        match (&err, &copy) {
            (LoadError::BatchFetch(a), LoadError::BatchFetch(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => unreachable!(),
        }
        assert!(copy.is_batch_level());
    }

    #[test]
    fn test_api_error_status_codes() {
        let test_cases = vec![
            (ApiError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (
                ApiError::Load(LoadError::BatchFetch(Arc::new(anyhow::anyhow!("down")))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Load(LoadError::ScopeClosed(ScopeId::SHARED)),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::Load(LoadError::Timeout {
                    keys: 1,
                    after: Duration::from_secs(1),
                }),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ApiError::Load(LoadError::Configuration("nope".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(
                response.status(),
                expected_status,
                "Error should map to correct HTTP status"
            );
        }
    }
}
