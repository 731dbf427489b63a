//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys are created once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling

use crate::auth::{PasswordService, TokenService};
use crate::config::AppConfig;
use crate::repositories::{PgUserStore, UserStore};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// This struct holds all shared resources that handlers need access to.
/// All fields are designed for cheap cloning across async tasks.
///
/// # Performance
///
/// - `store`: Arc'd trait object, cloning is O(1)
/// - `config`: Wrapped in Arc, cloning is O(1)
/// - `tokens`: Pre-computed keys wrapped in Arc, cloning is O(1)
#[derive(Clone)]
pub struct AppState {
    /// User persistence behind the store abstraction
    pub store: Arc<dyn UserStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized token service with cached keys
    pub tokens: TokenService,
    /// Password hasher carrying the configured work factor
    pub passwords: PasswordService,
}

impl AppState {
    /// Create application state backed by PostgreSQL
    ///
    /// # Note
    /// This pre-computes JWT keys from the config secret.
    /// The keys are expensive to derive, so this should only
    /// be called once at application startup.
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self::with_store(Arc::new(PgUserStore::new(pool)), config)
    }

    /// Create application state over any store implementation.
    /// Tests use this with the in-memory store.
    pub fn with_store(store: Arc<dyn UserStore>, config: AppConfig) -> Self {
        let tokens = TokenService::new(&config.jwt.secret, config.jwt.token_expiry_secs);
        let passwords = PasswordService::new(config.security.bcrypt_cost);

        Self {
            store,
            config: Arc::new(config),
            tokens,
            passwords,
        }
    }

    /// Get a reference to the user store
    #[inline]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the token service
    #[inline]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Get the password service
    #[inline]
    pub fn passwords(&self) -> PasswordService {
        self.passwords
    }
}
