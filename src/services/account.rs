//! Account lifecycle service
//!
//! Registration, login with lockout enforcement, and the password
//! reset and change flows.
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on blocking thread pool
//! - Token service is passed by reference (pre-computed keys)

use crate::auth::{PasswordService, TokenService};
use crate::config::SecurityConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::validation::{
    validate_email, validate_name, validate_password, validate_profile_field, validate_username,
};
use crate::models::{NewUser, Role, RoleProfile};
use crate::repositories::UserStore;
use crate::types::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordResponse, LoginRequest,
    PasswordChangedResponse, RegisterRequest, ResetPasswordRequest,
};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

/// Raw reset secret: 32 random bytes, hex-encoded.
fn generate_reset_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The store only ever sees the digest of the reset secret.
fn hash_reset_secret(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Account lifecycle operations
pub struct AccountService;

impl AccountService {
    /// Register a new account
    ///
    /// The role defaults to applicant. Username and email are stored
    /// lowercased so uniqueness is case-insensitive.
    ///
    /// # Performance
    /// Password hashing is offloaded to the blocking thread pool.
    pub async fn register(
        store: &dyn UserStore,
        tokens: &TokenService,
        passwords: PasswordService,
        request: RegisterRequest,
    ) -> ApiResult<AuthResponse> {
        validate_username(&request.username)
            .map_err(|m| ApiError::validation_field(m, "username"))?;
        validate_email(&request.email).map_err(|m| ApiError::validation_field(m, "email"))?;
        validate_password(&request.password)
            .map_err(|m| ApiError::validation_field(m, "password"))?;
        validate_name(&request.first_name)
            .map_err(|m| ApiError::validation_field(m, "first_name"))?;
        validate_name(&request.last_name)
            .map_err(|m| ApiError::validation_field(m, "last_name"))?;
        for (value, field) in [
            (&request.department, "department"),
            (&request.position, "position"),
            (&request.company, "company"),
        ] {
            if let Some(value) = value {
                validate_profile_field(value).map_err(|m| ApiError::validation_field(m, field))?;
            }
        }

        let role = request.role.unwrap_or(Role::Applicant);
        let profile =
            RoleProfile::from_parts(role, request.department, request.position, request.company)?;

        let username = request.username.to_lowercase();
        let email = request.email.to_lowercase();

        // Friendlier errors than a raw unique-constraint failure; the
        // store constraint remains the actual guarantee.
        if store.find_by_email(&email).await?.is_some() {
            return Err(ApiError::DuplicateCredential("email"));
        }
        if store.find_by_username(&username).await?.is_some() {
            return Err(ApiError::DuplicateCredential("username"));
        }

        let password_hash = passwords.hash_async(request.password).await?;

        let user = store
            .create(NewUser {
                username,
                email,
                password_hash,
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                profile,
                permissions: role.default_permissions(),
            })
            .await?;

        info!(user_id = %user.id, role = %role, "account registered");

        let token = tokens.issue(user.id, user.version)?;
        Ok(AuthResponse {
            user: user.public(),
            token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.expiry_secs(),
        })
    }

    /// Authenticate with email and password
    ///
    /// Lockout policy: after `max_failed_logins` consecutive failures
    /// the account locks for `lockout_duration_secs`, and attempts
    /// against a locked account fail without evaluating the password.
    /// Failure responses never distinguish an unknown email, a wrong
    /// password, or a locked account.
    ///
    /// # Performance
    /// Password verification is offloaded to the blocking thread pool.
    pub async fn login(
        store: &dyn UserStore,
        tokens: &TokenService,
        security: &SecurityConfig,
        request: LoginRequest,
    ) -> ApiResult<AuthResponse> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(ApiError::validation("Please provide an email and password"));
        }

        let email = request.email.to_lowercase();
        let Some(mut user) = store.find_by_email(&email).await? else {
            return Err(ApiError::InvalidCredentials);
        };

        if user.is_locked(security.lockout_duration_secs) {
            warn!(user_id = %user.id, "login attempt on locked account");
            return Err(ApiError::InvalidCredentials);
        }

        // A lapsed lock resets the failed-attempt window.
        if user.account_locked_at.is_some() {
            user.clear_lockout();
        }

        let valid =
            PasswordService::verify_async(request.password, user.password_hash.clone()).await?;

        if !valid {
            user.record_failed_login(security.max_failed_logins);
            if user.account_locked_at.is_some() {
                warn!(
                    user_id = %user.id,
                    attempts = user.failed_login_attempts,
                    "account locked after repeated failed logins"
                );
            }
            store.update(&user).await?;
            return Err(ApiError::InvalidCredentials);
        }

        user.clear_lockout();
        user.last_login = Some(Utc::now());
        let user = store.update(&user).await?;

        let token = tokens.issue(user.id, user.version)?;
        Ok(AuthResponse {
            user: user.public(),
            token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.expiry_secs(),
        })
    }

    /// Start a password reset
    ///
    /// Stores a short-lived SHA-256 digest of a fresh reset secret and
    /// hands the raw secret back. Mail delivery is out of scope, so
    /// the response carries the secret directly.
    pub async fn forgot_password(
        store: &dyn UserStore,
        security: &SecurityConfig,
        email: &str,
    ) -> ApiResult<ForgotPasswordResponse> {
        let email = email.to_lowercase();
        let Some(mut user) = store.find_by_email(&email).await? else {
            return Err(ApiError::NotFound(
                "No user found with this email address".to_string(),
            ));
        };

        let reset_token = generate_reset_secret();
        user.password_reset_token = Some(hash_reset_secret(&reset_token));
        user.password_reset_expires =
            Some(Utc::now() + Duration::seconds(security.reset_token_expiry_secs));
        store.update(&user).await?;

        info!(user_id = %user.id, "password reset token issued");

        Ok(ForgotPasswordResponse {
            message: "Password reset instructions sent to email".to_string(),
            reset_token,
        })
    }

    /// Complete a password reset
    ///
    /// Matches the supplied raw token against stored digests, sets the
    /// new password, clears reset and lockout state, and bumps the
    /// token version so every token issued before the reset stops
    /// working. The reset token is single-use.
    pub async fn reset_password(
        store: &dyn UserStore,
        tokens: &TokenService,
        passwords: PasswordService,
        raw_token: &str,
        request: ResetPasswordRequest,
    ) -> ApiResult<PasswordChangedResponse> {
        validate_password(&request.password)
            .map_err(|m| ApiError::validation_field(m, "password"))?;

        let digest = hash_reset_secret(raw_token);
        let Some(mut user) = store.find_by_reset_digest(&digest).await? else {
            return Err(ApiError::InvalidResetToken);
        };

        user.password_hash = passwords.hash_async(request.password).await?;
        user.password_reset_token = None;
        user.password_reset_expires = None;
        user.active = true;
        user.clear_lockout();
        user.bump_version();
        let user = store.update(&user).await?;

        info!(user_id = %user.id, "password reset completed");

        // Minted after the bump, so only this token is valid.
        let token = tokens.issue(user.id, user.version)?;
        Ok(PasswordChangedResponse {
            message: "Password reset successful".to_string(),
            token,
        })
    }

    /// Change the password of an authenticated account
    ///
    /// Requires the current password, bumps the token version, and
    /// returns a token minted after the bump.
    pub async fn change_password(
        store: &dyn UserStore,
        tokens: &TokenService,
        passwords: PasswordService,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> ApiResult<PasswordChangedResponse> {
        if request.current_password.is_empty() {
            return Err(ApiError::validation_field(
                "Current password is required",
                "current_password",
            ));
        }
        validate_password(&request.new_password)
            .map_err(|m| ApiError::validation_field(m, "new_password"))?;
        if request.new_password == request.current_password {
            return Err(ApiError::validation_field(
                "New password must be different from current password",
                "new_password",
            ));
        }

        let Some(mut user) = store.find_by_id(user_id).await? else {
            return Err(ApiError::NotFound("User not found".to_string()));
        };

        let valid =
            PasswordService::verify_async(request.current_password, user.password_hash.clone())
                .await?;
        if !valid {
            return Err(ApiError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        user.password_hash = passwords.hash_async(request.new_password).await?;
        user.bump_version();
        let user = store.update(&user).await?;

        info!(user_id = %user.id, "password changed");

        let token = tokens.issue(user.id, user.version)?;
        Ok(PasswordChangedResponse {
            message: "Password changed successfully".to_string(),
            token,
        })
    }
}
