//! API Handlers
//!
//! HTTP request handlers for each demo endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::debug;

use crate::config::{LoaderConfig, ServerConfig};
use crate::directory::{User, UserDirectory};
use crate::error::{ApiError, LoadError};
use crate::models::{HealthResponse, StatsResponse, UserResult, UsersQuery, UsersResponse};
use crate::scope::ScopeManager;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Scope factory bound to the user directory
    pub manager: Arc<ScopeManager<u64, User>>,
}

impl AppState {
    pub fn new(manager: ScopeManager<u64, User>) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }

    /// Builds the directory and the scope manager from configuration.
    pub fn from_config(
        server: &ServerConfig,
        loader: LoaderConfig<u64>,
    ) -> Result<Self, LoadError> {
        let directory = UserDirectory::new(
            server.directory_size,
            std::time::Duration::from_millis(server.directory_latency_ms),
        );
        Ok(Self::new(ScopeManager::new(directory, loader)?))
    }
}

/// Handler for GET /users
///
/// Resolves every requested id through a fresh scope so repeated ids and
/// concurrent lookups share one directory call. Per-id failures are reported
/// inline; the request only fails as a whole when every id failed for a
/// batch-level reason.
pub async fn users_handler(
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<Json<UsersResponse>, ApiError> {
    let ids = query.parse_ids().map_err(ApiError::InvalidRequest)?;

    let (ids, outcomes, scope_id, batches) = state
        .manager
        .with_scope(|loader| async move {
            let outcomes = loader.load_many(ids.iter().copied()).await;
            (ids, outcomes, loader.scope_id(), loader.batches_dispatched())
        })
        .await;
    debug!(scope = %scope_id, ids = ids.len(), batches, "Users request resolved");

    if outcomes
        .iter()
        .all(|outcome| matches!(outcome, Err(err) if err.is_batch_level()))
    {
        if let Some(Err(err)) = outcomes.into_iter().next() {
            return Err(ApiError::Load(err));
        }
        return Err(ApiError::InvalidRequest("No ids resolved".to_string()));
    }

    let results = ids
        .into_iter()
        .zip(outcomes)
        .map(|(id, outcome)| UserResult::new(id, outcome))
        .collect();

    Ok(Json(UsersResponse {
        scope_id,
        results,
        batches,
    }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.manager.stats(),
        state.manager.shared_cache_stats(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
