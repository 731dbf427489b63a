//! Profile service
//!
//! Self-service updates to the authenticated account. Every update
//! bumps the token version, so the response carries a fresh token.

use crate::auth::TokenService;
use crate::error::{ApiError, ApiResult};
use crate::models::validation::{
    validate_email, validate_name, validate_profile_field, validate_username,
};
use crate::models::RoleProfile;
use crate::repositories::UserStore;
use crate::types::{ProfileResponse, UpdateProfileRequest};
use tracing::info;
use uuid::Uuid;

/// Profile operations for the authenticated user
pub struct ProfileService;

impl ProfileService {
    /// Update the caller's own profile
    ///
    /// Absent fields keep their stored values. Username and email
    /// changes go through the same case-insensitive duplicate checks
    /// as registration. The role never changes here, and fields the
    /// role does not use are dropped.
    pub async fn update(
        store: &dyn UserStore,
        tokens: &TokenService,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> ApiResult<ProfileResponse> {
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
        for (value, field) in [
            (&request.department, "department"),
            (&request.position, "position"),
            (&request.company, "company"),
        ] {
            if let Some(value) = value {
                validate_profile_field(value).map_err(|m| ApiError::validation_field(m, field))?;
            }
        }

        let Some(mut user) = store.find_by_id(user_id).await? else {
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

        let department = request
            .department
            .or_else(|| user.profile.department().map(String::from));
        let position = request
            .position
            .or_else(|| user.profile.position().map(String::from));
        let company = request
            .company
            .or_else(|| user.profile.company().map(String::from));
        user.profile = RoleProfile::from_parts(user.role(), department, position, company)?;

        // Invalidate every previously issued token.
        user.bump_version();
        let user = store.update(&user).await?;

        info!(user_id = %user.id, "profile updated");

        let token = tokens.issue(user.id, user.version)?;
        Ok(ProfileResponse {
            user: user.public(),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PasswordService;
    use crate::models::{PublicUser, Role};
    use crate::repositories::MemoryUserStore;
    use crate::services::AccountService;
    use crate::types::RegisterRequest;

    fn tokens() -> TokenService {
        TokenService::new("test-secret", 3600)
    }

    async fn register(store: &MemoryUserStore, role: Option<Role>) -> PublicUser {
        let request = RegisterRequest {
            username: "rachel".to_string(),
            email: "r@x.com".to_string(),
            password: "Abc123".to_string(),
            first_name: "Rachel".to_string(),
            last_name: "Kim".to_string(),
            role,
            department: Some("Engineering".to_string()),
            position: Some("Recruiter".to_string()),
            company: Some("Acme".to_string()),
        };
        AccountService::register(store, &tokens(), PasswordService::new(4), request)
            .await
            .unwrap()
            .user
    }

    fn update(first_name: Option<&str>, department: Option<&str>) -> UpdateProfileRequest {
        UpdateProfileRequest {
            username: None,
            email: None,
            first_name: first_name.map(String::from),
            last_name: None,
            department: department.map(String::from),
            position: None,
            company: None,
        }
    }

    async fn register_named(store: &MemoryUserStore, username: &str, email: &str) -> PublicUser {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "Abc123".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role: None,
            department: None,
            position: None,
            company: None,
        };
        AccountService::register(store, &tokens(), PasswordService::new(4), request)
            .await
            .unwrap()
            .user
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_returns_fresh_token() {
        let store = MemoryUserStore::new();
        let user = register(&store, Some(Role::Recruiter)).await;

        let response =
            ProfileService::update(&store, &tokens(), user.id, update(Some("Rae"), None))
                .await
                .unwrap();

        assert_eq!(response.user.first_name, "Rae");
        assert_eq!(response.user.version, 2);
        let claims = tokens().verify(&response.token).unwrap();
        assert_eq!(claims.version, 2);
    }

    #[tokio::test]
    async fn test_update_preserves_unspecified_fields() {
        let store = MemoryUserStore::new();
        let user = register(&store, Some(Role::Recruiter)).await;

        let response =
            ProfileService::update(&store, &tokens(), user.id, update(None, Some("Sales")))
                .await
                .unwrap();

        assert_eq!(response.user.profile.department(), Some("Sales"));
        assert_eq!(response.user.profile.position(), Some("Recruiter"));
        assert_eq!(response.user.profile.company(), Some("Acme"));
        assert_eq!(response.user.first_name, "Rachel");
    }

    #[tokio::test]
    async fn test_applicant_profile_fields_are_dropped() {
        let store = MemoryUserStore::new();
        let user = register(&store, None).await;

        let response =
            ProfileService::update(&store, &tokens(), user.id, update(None, Some("Sales")))
                .await
                .unwrap();

        assert!(response.user.profile.department().is_none());
        assert_eq!(response.user.profile.role(), Role::Applicant);
    }

    #[tokio::test]
    async fn test_update_changes_email_and_username() {
        let store = MemoryUserStore::new();
        let user = register(&store, None).await;

        let request = UpdateProfileRequest {
            username: Some("Rae42".to_string()),
            email: Some("Rae@Y.com".to_string()),
            ..update(None, None)
        };
        let response = ProfileService::update(&store, &tokens(), user.id, request)
            .await
            .unwrap();

        assert_eq!(response.user.username, "rae42");
        assert_eq!(response.user.email, "rae@y.com");
        assert_eq!(response.user.version, 2);

        // The change landed in the store, not just the response.
        let stored = store.find_by_email("rae@y.com").await.unwrap().unwrap();
        assert_eq!(stored.username, "rae42");
        assert!(store.find_by_email("r@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_taken_credentials() {
        let store = MemoryUserStore::new();
        let rachel = register(&store, None).await;
        register_named(&store, "bob", "b@x.com").await;

        let request = UpdateProfileRequest {
            email: Some("B@X.com".to_string()),
            ..update(None, None)
        };
        let err = ProfileService::update(&store, &tokens(), rachel.id, request)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateCredential("email")));

        let request = UpdateProfileRequest {
            username: Some("Bob".to_string()),
            ..update(None, None)
        };
        let err = ProfileService::update(&store, &tokens(), rachel.id, request)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateCredential("username")));

        // Re-submitting the current values is not a conflict.
        let request = UpdateProfileRequest {
            username: Some("rachel".to_string()),
            email: Some("r@x.com".to_string()),
            ..update(None, None)
        };
        let response = ProfileService::update(&store, &tokens(), rachel.id, request)
            .await
            .unwrap();
        assert_eq!(response.user.username, "rachel");
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_name() {
        let store = MemoryUserStore::new();
        let user = register(&store, None).await;

        let err = ProfileService::update(&store, &tokens(), user.id, update(Some("R"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));

        // Nothing was written.
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
    }
}
