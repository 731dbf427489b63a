//! Integration tests for health check endpoints

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_endpoint() {
    let app = common::TestApp::new();

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(!body["version"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_liveness_endpoint() {
    let app = common::TestApp::new();

    let (status, body) = app.get("/health/live", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let app = common::TestApp::new();

    let (status, body) = app.get("/health/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["store"]["status"], "healthy");
}
