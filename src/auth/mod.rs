//! Authentication module
//!
//! Provides JWT-based authentication with bcrypt password hashing,
//! version-based token revocation, and role/permission checks.

mod identity;
mod password;
mod token;

pub use identity::{require_auth, Identity};
pub use password::PasswordService;
pub use token::{Claims, JwtKeys, TokenError, TokenService};
