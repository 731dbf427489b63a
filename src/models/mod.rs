//! Domain model types shared across services, stores, and routes.

pub mod user;
pub mod validation;

pub use user::{NewUser, Permission, PublicUser, Role, RoleProfile, User};
