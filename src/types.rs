//! API request and response types

use crate::models::{PublicUser, Role};
use serde::{Deserialize, Serialize};

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// Defaults to applicant when omitted.
    #[serde(default)]
    pub role: Option<Role>,
    /// Required for recruiters and admins.
    #[serde(default)]
    pub department: Option<String>,
    /// Required for recruiters and hiring managers.
    #[serde(default)]
    pub position: Option<String>,
    /// Required for recruiters and hiring managers.
    #[serde(default)]
    pub company: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authentication response: the account plus a freshly issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Forgot-password request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Forgot-password response
///
/// Carries the raw reset token in lieu of outbound email delivery;
/// only its SHA-256 digest is ever stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordResponse {
    pub message: String,
    pub reset_token: String,
}

/// Reset-password request; the reset token travels in the URL path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Change-password request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Password change or reset response with a token minted after the
/// version bump, since the bump revokes every earlier token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChangedResponse {
    pub message: String,
    pub token: String,
}

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// Stored lowercased; conflicts with another account are a 409.
    #[serde(default)]
    pub username: Option<String>,
    /// Stored lowercased; conflicts with another account are a 409.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

/// Profile update response; the token is fresh because the update
/// bumps the account version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Admin user update request; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Plain acknowledgment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
