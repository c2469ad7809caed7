//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle of the demo server.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use keyloader::{api::create_router, directory::UserDirectory, AppState, LoaderConfig, ScopeManager};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_state(config: LoaderConfig<u64>) -> AppState {
    let directory = UserDirectory::new(50, Duration::ZERO);
    AppState::new(ScopeManager::new(directory, config).unwrap())
}

fn create_test_app() -> Router {
    create_router(create_test_state(LoaderConfig::new()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// == Users Endpoint Tests ==

#[tokio::test]
async fn test_users_endpoint_batches_request() {
    let (status, json) = get(create_test_app(), "/users?ids=4,2,4,8").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["batches"], 1);

    let results = json["results"].as_array().unwrap();
    let ids: Vec<u64> = results.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![4, 2, 4, 8]);
    assert_eq!(results[0]["user"]["email"], "user4@example.com");
    assert_eq!(results[0]["user"]["manager_id"], 2);
    assert_eq!(results[1]["user"]["manager_id"], 1);
}

#[tokio::test]
async fn test_users_endpoint_reports_missing_users_inline() {
    let (status, json) = get(create_test_app(), "/users?ids=1,500").await;

    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert!(results[0].get("error").is_none());
    assert!(results[1].get("user").is_none());
    assert!(results[1]["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn test_users_endpoint_uses_new_scope_per_request() {
    let state = create_test_state(LoaderConfig::new());

    let (_, first) = get(create_router(state.clone()), "/users?ids=1").await;
    let (_, second) = get(create_router(state.clone()), "/users?ids=1").await;

    assert_ne!(first["scope_id"], second["scope_id"]);
    // Per-scope caches do not survive the request
    assert_eq!(second["batches"], 1);
}

#[tokio::test]
async fn test_users_endpoint_shared_cache_skips_fetch() {
    let state = create_test_state(LoaderConfig::new().with_shared_cache(true));

    get(create_router(state.clone()), "/users?ids=1,2").await;
    let (status, json) = get(create_router(state.clone()), "/users?ids=2,1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["batches"], 0);
    assert_eq!(json["results"][0]["user"]["id"], 2);
}

#[tokio::test]
async fn test_users_endpoint_invalid_ids() {
    let (status, json) = get(create_test_app(), "/users?ids=1,abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn test_users_endpoint_missing_ids() {
    let (status, json) = get(create_test_app(), "/users").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_counts_scopes_and_batches() {
    let state = create_test_state(LoaderConfig::new());

    get(create_router(state.clone()), "/users?ids=1,2,3").await;
    get(create_router(state.clone()), "/users?ids=3").await;
    let (status, json) = get(create_router(state), "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["engine"]["scopes_created"], 2);
    assert_eq!(json["engine"]["scopes_destroyed"], 2);
    assert_eq!(json["engine"]["scopes_active"], 0);
    assert_eq!(json["engine"]["batches_dispatched"], 2);
    assert_eq!(json["engine"]["keys_fetched"], 4);
    assert!(json.get("shared_cache").is_none());
}

#[tokio::test]
async fn test_stats_endpoint_with_shared_cache() {
    let state = create_test_state(LoaderConfig::new().with_shared_cache(true));

    get(create_router(state.clone()), "/users?ids=5").await;
    get(create_router(state.clone()), "/users?ids=5").await;
    let (_, json) = get(create_router(state), "/stats").await;

    assert_eq!(json["shared_cache"]["total_entries"], 1);
    assert_eq!(json["shared_cache"]["hits"], 1);
    assert_eq!(json["engine"]["cache_hits"], 1);
    assert!(json["hit_rate"].as_f64().unwrap() > 0.0);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = get(create_test_app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let response = create_test_app()
        .oneshot(Request::builder().uri("/set").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
