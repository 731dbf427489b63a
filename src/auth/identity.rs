//! Authentication and authorization gates
//!
//! Provides the extractor that validates bearer tokens and loads the
//! requesting identity, plus role and permission checks on top of it.
//!
//! # Performance
//!
//! Uses pre-computed JWT keys from AppState to avoid expensive
//! key derivation on every request.

use crate::auth::TokenError;
use crate::error::ApiError;
use crate::models::{Permission, PublicUser, Role};
use crate::state::AppState;
use axum::{
    extract::{FromRef, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Authenticated identity extracted from a bearer token
///
/// The extractor validates the token, loads the subject from the
/// store, and rejects tokens whose embedded version no longer matches
/// the account. The password hash never leaves the store layer.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: PublicUser,
}

impl Identity {
    #[inline]
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.user.profile.role()
    }

    /// Authorization gate: the caller must hold one of the given roles.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role()) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "User role {} is not authorized to access this route",
                self.role()
            )))
        }
    }

    /// Authorization gate: the caller must hold the given permission.
    pub fn require_permission(&self, permission: Permission) -> Result<(), ApiError> {
        if self.user.permissions.contains(&permission) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }
}

/// Shared authentication path for the extractor and the layer variant.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, ApiError> {
    // Extract Authorization header
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    // Check Bearer prefix
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

    // Expired and invalid tokens are reported distinctly so clients
    // can drive a re-login flow on expiry.
    let claims = state.tokens().verify(token).map_err(|e| match e {
        TokenError::Expired => ApiError::Unauthorized("Token expired".to_string()),
        TokenError::Invalid => ApiError::Unauthorized("Invalid token".to_string()),
    })?;

    // Covers accounts deleted after the token was issued.
    let user = state
        .store()
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    // A version bump revokes every previously issued token.
    if claims.version != user.version {
        return Err(ApiError::Unauthorized("Stale token".to_string()));
    }

    Ok(Identity {
        user: user.public(),
    })
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for Identity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        authenticate(&app_state, &parts.headers).await
    }
}

/// Middleware function for authentication (alternative to extractor)
///
/// Use this to apply auth to a group of routes via
/// `middleware::from_fn_with_state`; handlers below the layer read the
/// identity from request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
