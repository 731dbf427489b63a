//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the store, the token service, and the password hasher.

pub mod account;
pub mod profile;
pub mod users;

pub use account::AccountService;
pub use profile::ProfileService;
pub use users::UserService;
