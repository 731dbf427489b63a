//! JWT issuance and verification.
//!
//! Tokens are stateless HS256 bearer tokens carrying the user id and
//! the user's token version. Verification never consults the store;
//! the version comparison happens in the authentication extractor.
//! Keys are pre-computed once at startup and cached in app state.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// User token version at issue time; a mismatch with the stored
    /// version means every older token is revoked.
    pub version: u32,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Verification failure, split so callers can drive re-login UX from
/// expired-vs-invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

/// Pre-computed JWT keys for efficient token operations
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Token service with cached keys, wrapped in Arc for cheap cloning.
/// Create once at application startup and store in AppState.
#[derive(Clone)]
pub struct TokenService {
    keys: JwtKeys,
    expiry_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            keys: JwtKeys::new(secret),
            expiry_secs,
        }
    }

    /// Issue a token for a user at their current version.
    #[inline]
    pub fn issue(&self, user_id: Uuid, version: u32) -> Result<String> {
        self.issue_with_expiry(user_id, version, self.expiry_secs)
    }

    /// Issue a token with an explicit expiry offset in seconds
    /// (negative offsets produce already-expired tokens for tests).
    pub fn issue_with_expiry(&self, user_id: Uuid, version: u32, expiry_secs: i64) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            version,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        };

        encode(&Header::default(), &claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// Stateless: the version in the claims is returned as-is for the
    /// caller to compare against the stored user.
    #[inline]
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, self.keys.decoding(), &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    /// Token lifetime in seconds, as configured.
    #[inline]
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }
}
