//! Response DTOs for the demo API

use serde::Serialize;

use crate::cache::CacheStats;
use crate::directory::User;
use crate::error::LoadError;
use crate::scope::{EngineStats, ScopeId};

/// Outcome of one requested id, aligned with the request order.
#[derive(Debug, Clone, Serialize)]
pub struct UserResult {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UserResult {
    pub fn new(id: u64, outcome: Result<User, LoadError>) -> Self {
        match outcome {
            Ok(user) => Self {
                id,
                user: Some(user),
                error: None,
            },
            Err(err) => Self {
                id,
                user: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Response body for `GET /users`
#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    /// Scope that served the request
    pub scope_id: ScopeId,
    pub results: Vec<UserResult>,
    /// Bulk calls the scope made to the directory
    pub batches: u64,
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub engine: EngineStats,
    /// Present when the shared cache region is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_cache: Option<CacheStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_rate: Option<f64>,
}

impl StatsResponse {
    pub fn new(engine: EngineStats, shared_cache: Option<CacheStats>) -> Self {
        let hit_rate = shared_cache.as_ref().map(CacheStats::hit_rate);
        Self {
            engine,
            shared_cache,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
