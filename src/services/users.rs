//! User management service
//!
//! Administrative operations over accounts. Routes gate these behind
//! the manage-users permission.

use crate::error::{ApiError, ApiResult};
use crate::models::validation::{validate_email, validate_name, validate_username};
use crate::models::{PublicUser, RoleProfile, User};
use crate::repositories::UserStore;
use crate::types::{AdminUpdateUserRequest, MessageResponse};
use tracing::info;
use uuid::Uuid;

/// Administrative account operations
pub struct UserService;

impl UserService {
    /// List all accounts, newest first
    pub async fn list(store: &dyn UserStore) -> ApiResult<Vec<PublicUser>> {
        let users = store.list().await?;
        Ok(users.iter().map(User::public).collect())
    }

    /// Fetch a single account
    pub async fn get(store: &dyn UserStore, id: Uuid) -> ApiResult<PublicUser> {
        let Some(user) = store.find_by_id(id).await? else {
            return Err(ApiError::NotFound("User not found".to_string()));
        };
        Ok(user.public())
    }

    /// Update an account, including its role
    ///
    /// A role change re-validates the role-conditional profile fields
    /// against the new role but keeps the permission snapshot taken at
    /// creation. The version bump signs the user out everywhere.
    pub async fn update(
        store: &dyn UserStore,
        id: Uuid,
        request: AdminUpdateUserRequest,
    ) -> ApiResult<PublicUser> {
        if let Some(username) = &request.username {
            validate_username(username).map_err(|m| ApiError::validation_field(m, "username"))?;
        }
        if let Some(email) = &request.email {
            validate_email(email).map_err(|m| ApiError::validation_field(m, "email"))?;
        }
        if let Some(first_name) = &request.first_name {
            validate_name(first_name).map_err(|m| ApiError::validation_field(m, "first_name"))?;
        }
        if let Some(last_name) = &request.last_name {
            validate_name(last_name).map_err(|m| ApiError::validation_field(m, "last_name"))?;
        }

        let Some(mut user) = store.find_by_id(id).await? else {
            return Err(ApiError::NotFound("User not found".to_string()));
        };

        if let Some(username) = request.username {
            let username = username.to_lowercase();
            if username != user.username && store.find_by_username(&username).await?.is_some() {
                return Err(ApiError::DuplicateCredential("username"));
            }
            user.username = username;
        }
        if let Some(email) = request.email {
            let email = email.to_lowercase();
            if email != user.email && store.find_by_email(&email).await?.is_some() {
                return Err(ApiError::DuplicateCredential("email"));
            }
            user.email = email;
        }
        if let Some(first_name) = request.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(role) = request.role {
            // The permission snapshot is not recomputed on role change.
            user.profile = RoleProfile::from_parts(
                role,
                user.profile.department().map(String::from),
                user.profile.position().map(String::from),
                user.profile.company().map(String::from),
            )?;
        }

        user.bump_version();
        let user = store.update(&user).await?;

        info!(user_id = %user.id, "user updated by admin");

        Ok(user.public())
    }

    /// Delete an account
    pub async fn delete(store: &dyn UserStore, id: Uuid) -> ApiResult<MessageResponse> {
        if !store.delete(id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(user_id = %id, "user deleted by admin");

        Ok(MessageResponse {
            message: "User removed successfully".to_string(),
        })
    }
}
