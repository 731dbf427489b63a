//! Property-based tests for the authentication gate
//!
//! Requests without a valid bearer token never reach a protected
//! handler; expired, invalid, and stale tokens are all rejected with
//! 401 and a reason the client can act on.

#[cfg(test)]
mod tests {
    use crate::auth::TokenService;
    use crate::config::AppConfig;
    use crate::repositories::{MemoryUserStore, UserStore};
    use crate::routes::create_router;
    use crate::state::AppState;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    /// Create a test app state backed by the in-memory store
    fn create_test_state() -> AppState {
        create_test_state_with(Arc::new(MemoryUserStore::new()))
    }

    fn create_test_state_with(store: Arc<MemoryUserStore>) -> AppState {
        let mut config = AppConfig::default();
        // Keep password hashing fast in tests.
        config.security.bcrypt_cost = 4;
        AppState::with_store(store, config)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri).method("GET");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .method(method)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    /// Register a user and return (token, response body)
    async fn register(app: &Router) -> (String, Value) {
        let request = json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            json!({
                "username": "alice",
                "email": "a@x.com",
                "password": "Abc123",
                "first_name": "Alice",
                "last_name": "Lee",
            }),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let token = body["token"].as_str().unwrap().to_string();
        (token, body)
    }

    /// Generate random invalid tokens
    fn invalid_token_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            // Empty token
            Just("".to_string()),
            // Random string (not a valid JWT)
            "[a-zA-Z0-9]{10,50}".prop_map(|s| s),
            // Malformed JWT (wrong number of parts)
            "[a-zA-Z0-9]{10}\\.[a-zA-Z0-9]{10}".prop_map(|s| s),
            // Valid format but invalid signature
            "[a-zA-Z0-9_-]{20}\\.[a-zA-Z0-9_-]{20}\\.[a-zA-Z0-9_-]{20}".prop_map(|s| s),
        ]
    }

    /// Generate random authorization header formats
    fn auth_header_strategy() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            // No header
            Just(None),
            // Missing Bearer prefix
            invalid_token_strategy().prop_map(Some),
            // Wrong prefix
            invalid_token_strategy().prop_map(|t| Some(format!("Basic {}", t))),
            // Bearer with invalid token
            invalid_token_strategy().prop_map(|t| Some(format!("Bearer {}", t))),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: unauthenticated requests to protected endpoints return 401
        #[test]
        fn prop_unauthenticated_requests_return_401(
            auth_header in auth_header_strategy()
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let state = create_test_state();
                let app = create_router(state);

                let mut request_builder = Request::builder()
                    .uri("/api/v1/auth/me")
                    .method("GET");

                if let Some(header) = auth_header {
                    request_builder = request_builder.header("Authorization", header);
                }

                let request = request_builder.body(Body::empty()).unwrap();
                let response = app.oneshot(request).await.unwrap();

                prop_assert_eq!(
                    response.status(),
                    StatusCode::UNAUTHORIZED,
                    "Expected 401 for unauthenticated request"
                );

                Ok(())
            })?;
        }
    }

    #[tokio::test]
    async fn test_missing_auth_header_returns_401() {
        let app = create_router(create_test_state());
        let response = app
            .oneshot(get("/api/v1/auth/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_auth_scheme_returns_401() {
        let app = create_router(create_test_state());
        let request = Request::builder()
            .uri("/api/v1/auth/me")
            .method("GET")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_with_wrong_secret_returns_401() {
        let app = create_router(create_test_state());

        // Token signed with a DIFFERENT secret
        let other = TokenService::new("wrong-secret-key", 3600);
        let token = other.issue(Uuid::new_v4(), 1).unwrap();

        let response = app
            .oneshot(get("/api/v1/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_expired_token_is_distinguishable() {
        let state = create_test_state();
        let token = state
            .tokens()
            .issue_with_expiry(Uuid::new_v4(), 1, -120)
            .unwrap();
        let app = create_router(state);

        let response = app
            .oneshot(get("/api/v1/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Token expired");
    }

    #[tokio::test]
    async fn test_valid_token_authenticates() {
        let app = create_router(create_test_state());
        let (token, registered) = register(&app).await;

        let response = app
            .oneshot(get("/api/v1/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["username"], "alice");
        assert_eq!(body["id"], registered["user"]["id"]);
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_returns_401() {
        let store = Arc::new(MemoryUserStore::new());
        let app = create_router(create_test_state_with(store.clone()));

        let (token, registered) = register(&app).await;
        let id = Uuid::parse_str(registered["user"]["id"].as_str().unwrap()).unwrap();
        store.delete(id).await.unwrap();

        let response = app
            .oneshot(get("/api/v1/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "User not found");
    }

    #[tokio::test]
    async fn test_stale_token_after_profile_update() {
        let app = create_router(create_test_state());
        let (old_token, _) = register(&app).await;

        // The profile update bumps the version and returns a fresh token.
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/v1/profile",
                Some(&old_token),
                json!({"first_name": "Alicia"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let new_token = body["token"].as_str().unwrap().to_string();

        // Every token issued before the bump is now rejected.
        let response = app
            .clone()
            .oneshot(get("/api/v1/auth/me", Some(&old_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Stale token");

        // The fresh one works.
        let response = app
            .oneshot(get("/api/v1/auth/me", Some(&new_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
