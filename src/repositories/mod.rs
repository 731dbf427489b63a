//! User persistence
//!
//! Provides the storage abstraction the services work against, with a
//! PostgreSQL implementation for production and an in-memory one for
//! tests and local development.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use store::{StoreError, UserStore};
