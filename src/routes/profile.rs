//! Profile routes
//!
//! Self-service access to the authenticated account.

use crate::auth::Identity;
use crate::error::ApiResult;
use crate::models::PublicUser;
use crate::services::ProfileService;
use crate::state::AppState;
use crate::types::{ProfileResponse, UpdateProfileRequest};
use axum::{extract::State, routing::get, Json, Router};

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(update_profile))
}

/// Get the authenticated user's profile
///
/// GET /api/v1/profile
async fn get_profile(identity: Identity) -> Json<PublicUser> {
    Json(identity.user)
}

/// Update the authenticated user's profile
///
/// PUT /api/v1/profile
///
/// The update bumps the token version, so the response carries a
/// fresh token and every earlier token stops working.
async fn update_profile(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let response =
        ProfileService::update(state.store(), state.tokens(), identity.id(), req).await?;
    Ok(Json(response))
}
