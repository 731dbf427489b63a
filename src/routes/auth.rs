//! Authentication routes
//!
//! Registration, login, logout, and the password reset and change
//! flows.
//!
//! # Performance Optimizations
//!
//! - Uses pre-computed JWT keys from AppState (no per-request allocation)
//! - Password hashing runs on blocking thread pool (doesn't block async runtime)

use crate::auth::Identity;
use crate::error::ApiResult;
use crate::models::PublicUser;
use crate::services::AccountService;
use crate::state::AppState;
use crate::types::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, ForgotPasswordResponse,
    LoginRequest, MessageResponse, PasswordChangedResponse, RegisterRequest, ResetPasswordRequest,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/me", get(me))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/:token", put(reset_password))
        .route("/change-password", put(change_password))
}

/// Register a new account
///
/// POST /api/v1/auth/register
///
/// # Performance
/// Password hashing is offloaded to blocking thread pool.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response =
        AccountService::register(state.store(), state.tokens(), state.passwords(), req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
///
/// # Performance
/// Password verification is offloaded to blocking thread pool.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = AccountService::login(
        state.store(),
        state.tokens(),
        &state.config().security,
        req,
    )
    .await?;
    Ok(Json(response))
}

/// Log out (requires authentication)
///
/// GET /api/v1/auth/logout
///
/// Tokens are stateless, so this is an acknowledgment; the client
/// discards its token. Revocation happens through version bumps.
async fn logout(_identity: Identity) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

/// Get the authenticated account
///
/// GET /api/v1/auth/me
///
/// # Authentication
/// Requires valid Bearer token in Authorization header.
async fn me(identity: Identity) -> Json<PublicUser> {
    Json(identity.user)
}

/// Start a password reset
///
/// POST /api/v1/auth/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<ForgotPasswordResponse>> {
    let response =
        AccountService::forgot_password(state.store(), &state.config().security, &req.email)
            .await?;
    Ok(Json(response))
}

/// Complete a password reset with the raw token from the path
///
/// PUT /api/v1/auth/reset-password/:token
async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<PasswordChangedResponse>> {
    let response = AccountService::reset_password(
        state.store(),
        state.tokens(),
        state.passwords(),
        &token,
        req,
    )
    .await?;
    Ok(Json(response))
}

/// Change the password of the authenticated account
///
/// PUT /api/v1/auth/change-password
async fn change_password(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<PasswordChangedResponse>> {
    let response = AccountService::change_password(
        state.store(),
        state.tokens(),
        state.passwords(),
        identity.id(),
        req,
    )
    .await?;
    Ok(Json(response))
}
