//! Input validation for account fields.
//!
//! Validators return `Result<(), String>` with user-facing messages;
//! the service layer maps failures to field-level validation errors.

use validator::ValidateEmail;

/// Validate username: 3-30 characters, alphanumeric only.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }
    if username.len() > 30 {
        return Err("Username cannot be longer than 30 characters".to_string());
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Username must only contain alpha-numeric characters".to_string());
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Please enter a valid email address".to_string());
    }
    Ok(())
}

/// Validate password policy: at least 6 characters with one uppercase
/// letter, one lowercase letter, and one digit.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err(
            "Password must contain at least one uppercase letter, one lowercase letter, and one number"
                .to_string(),
        );
    }
    Ok(())
}

/// Validate a person name (first or last): 2-50 characters.
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.len() < 2 {
        return Err("Name must be at least 2 characters long".to_string());
    }
    if trimmed.len() > 50 {
        return Err("Name cannot be longer than 50 characters".to_string());
    }
    Ok(())
}

/// Validate a role-conditional profile field (department, position,
/// company): 2-50 characters when present.
pub fn validate_profile_field(value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.len() < 2 {
        return Err("Must be at least 2 characters long".to_string());
    }
    if trimmed.len() > 50 {
        return Err("Cannot be longer than 50 characters".to_string());
    }
    Ok(())
}
