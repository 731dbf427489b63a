//! User management routes
//!
//! Administrative CRUD over accounts. The whole subtree sits behind
//! the authentication layer; each handler then requires the
//! manage-users permission.

use crate::auth::{require_auth, Identity};
use crate::error::ApiResult;
use crate::models::{Permission, PublicUser};
use crate::services::UserService;
use crate::state::AppState;
use crate::types::{AdminUpdateUserRequest, MessageResponse};
use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

/// Create user management routes
///
/// Authentication is applied as a route layer here rather than via
/// the extractor; handlers read the identity from extensions.
pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

/// List all users
///
/// GET /api/v1/users
async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    identity.require_permission(Permission::ManageUsers)?;
    let users = UserService::list(state.store()).await?;
    Ok(Json(users))
}

/// Get a user by id
///
/// GET /api/v1/users/:id
async fn get_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PublicUser>> {
    identity.require_permission(Permission::ManageUsers)?;
    let user = UserService::get(state.store(), id).await?;
    Ok(Json(user))
}

/// Update a user, including their role
///
/// PUT /api/v1/users/:id
async fn update_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> ApiResult<Json<PublicUser>> {
    identity.require_permission(Permission::ManageUsers)?;
    let user = UserService::update(state.store(), id, req).await?;
    Ok(Json(user))
}

/// Delete a user
///
/// DELETE /api/v1/users/:id
async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    identity.require_permission(Permission::ManageUsers)?;
    let response = UserService::delete(state.store(), id).await?;
    Ok(Json(response))
}
