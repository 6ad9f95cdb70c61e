//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use walkv::{api::create_router, wal::WriteAheadLog, AppState, Store};

// == Helper Functions ==

async fn create_test_app(dir: &TempDir, capacity: usize) -> Router {
    let wal = WriteAheadLog::new(dir.path().join("wal.log")).with_fsync(false);
    let store = Store::with_wal(capacity, wal);
    store.initialize().await.unwrap();
    create_router(AppState::new(store))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_request(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/set")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get_request(key: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/get/{key}"))
        .body(Body::empty())
        .unwrap()
}

fn delete_request(key: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(format!("/delete/{key}"))
        .body(Body::empty())
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    let response = app
        .oneshot(set_request(r#"{"key":"test_key","value":"test_value"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["key"], "test_key");
}

#[tokio::test]
async fn test_set_endpoint_with_ttl() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    let response = app
        .oneshot(set_request(r#"{"key":"ttl_key","value":"ttl_value","ttl":60}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_set_endpoint_rejects_zero_ttl() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    let response = app
        .oneshot(set_request(r#"{"key":"k","value":"v","ttl":0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("TTL"));
}

#[tokio::test]
async fn test_set_endpoint_rejects_empty_key() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    let response = app
        .oneshot(set_request(r#"{"key":"","value":"v"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    let set_response = app
        .clone()
        .oneshot(set_request(r#"{"key":"get_key","value":"get_value"}"#))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app.oneshot(get_request("get_key")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"], "get_key");
    assert_eq!(json["value"], "get_value");
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    let response = app.oneshot(get_request("nonexistent_key")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    let set_response = app
        .clone()
        .oneshot(set_request(r#"{"key":"delete_key","value":"delete_value"}"#))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let del_response = app.clone().oneshot(delete_request("delete_key")).await.unwrap();
    assert_eq!(del_response.status(), StatusCode::OK);
    let json = body_to_json(del_response.into_body()).await;
    assert_eq!(json["status"], "deleted");

    let get_response = app.oneshot(get_request("delete_key")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_not_found() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    let response = app.oneshot(delete_request("nonexistent_key")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 2).await;

    for body in [
        r#"{"key":"a","value":"1"}"#,
        r#"{"key":"b","value":"2"}"#,
        r#"{"key":"c","value":"3"}"#,
    ] {
        let response = app.clone().oneshot(set_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // a was evicted
    let miss = app.clone().oneshot(get_request("a")).await.unwrap();
    assert_eq!(miss.status(), StatusCode::NOT_FOUND);
    let hit = app.clone().oneshot(get_request("c")).await.unwrap();
    assert_eq!(hit.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total_keys"], 2);
    assert_eq!(json["cache_hits"], 1);
    assert_eq!(json["cache_misses"], 1);
    assert_eq!(json["evictions"], 1);
    assert_eq!(json["log_size"], 3);
    assert!(json["last_compaction"].is_null());
    assert!(json["uptime_seconds"].as_f64().unwrap() >= 0.0);
}

// == COMPACT Endpoint Tests ==

#[tokio::test]
async fn test_compact_endpoint_shrinks_log() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    for body in [
        r#"{"key":"k","value":"1"}"#,
        r#"{"key":"k","value":"2"}"#,
        r#"{"key":"k","value":"3"}"#,
    ] {
        app.clone().oneshot(set_request(body)).await.unwrap();
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compact")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "compacted");
    assert_eq!(json["old_size"], 3);
    assert_eq!(json["new_size"], 1);

    let get_response = app.oneshot(get_request("k")).await.unwrap();
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["value"], "3");
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(&dir, 100).await;

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
