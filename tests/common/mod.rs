//! Common test utilities for integration tests
//!
//! The harness runs the full router over the in-memory store, so the
//! suite needs no external services. The store handle is kept so tests
//! can inspect or mutate records directly.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use job_tracker_backend::{
    config::AppConfig, repositories::MemoryUserStore, routes, state::AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryUserStore>,
}

impl TestApp {
    /// Create a new test application over a fresh in-memory store
    pub fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::with_store(store.clone(), config);
        let app = routes::create_router(state);

        Self { app, store }
    }

    /// Make a request, optionally authenticated, with an optional JSON body
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", path, token, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request("POST", path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PUT", path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", path, token, None).await
    }

    /// Register an applicant account and return the response body
    /// (user + token)
    pub async fn register_applicant(&self, username: &str, email: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({
                    "username": username,
                    "email": email,
                    "password": "Abc123",
                    "first_name": "Test",
                    "last_name": "User",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
        body
    }

    /// Register an admin account and return the response body
    pub async fn register_admin(&self, username: &str, email: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({
                    "username": username,
                    "email": email,
                    "password": "Abc123",
                    "first_name": "Ada",
                    "last_name": "Min",
                    "role": "admin",
                    "department": "Operations",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
        body
    }

    /// Log in and return the response body
    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/api/v1/auth/login",
            None,
            json!({"email": email, "password": password}),
        )
        .await
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.jwt.secret = "test-secret-key-for-testing-only-32chars".to_string();
    // Keep password hashing fast in tests.
    config.security.bcrypt_cost = 4;
    config
}
