//! Abstract persistence interface for user records.
//!
//! Services receive an `Arc<dyn UserStore>` at construction, so tests
//! can substitute the in-memory implementation for PostgreSQL.

use crate::models::{NewUser, User};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Store-level errors surfaced to the service layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique-constraint violation, naming the conflicting field.
    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error("Record not found")]
    NotFound,

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Persistence operations for user records.
///
/// Lookups expect already-lowercased username/email values; records are
/// stored lowercased so equality is case-insensitive end to end.
/// Reads after writes against the same store are strongly consistent.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Match a stored reset-token digest whose expiry is still in the
    /// future. Expired requests never match.
    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new record. A unique violation on username or email
    /// maps to [`StoreError::Duplicate`]; this is the ultimate
    /// uniqueness guarantee behind the services' friendlier pre-checks.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Whole-record write of every mutable field. Unique violations
    /// map the same way as on create.
    async fn update(&self, user: &User) -> Result<User, StoreError>;

    /// Remove a record; `false` when no such id existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Connectivity check for the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
