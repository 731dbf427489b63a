//! In-memory user store for tests and local development.

use crate::models::{NewUser, User};
use crate::repositories::{StoreError, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// User store backed by a [`HashMap`]. Enforces the same uniqueness
/// rules as the PostgreSQL store so tests exercise real conflicts.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, User>>, StoreError> {
        self.users
            .read()
            .map_err(|_| StoreError::Internal(anyhow::anyhow!("user store lock poisoned")))
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, User>>, StoreError> {
        self.users
            .write()
            .map_err(|_| StoreError::Internal(anyhow::anyhow!("user store lock poisoned")))
    }
}

/// Uniqueness check over everyone except `exclude` (the record being
/// updated). Values are compared as stored; callers lowercase them.
fn check_unique(
    users: &HashMap<Uuid, User>,
    username: &str,
    email: &str,
    exclude: Option<Uuid>,
) -> Result<(), StoreError> {
    for user in users.values() {
        if Some(user.id) == exclude {
            continue;
        }
        if user.email == email {
            return Err(StoreError::Duplicate("email"));
        }
        if user.username == username {
            return Err(StoreError::Duplicate("username"));
        }
    }
    Ok(())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.read_guard()?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read_guard()?
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read_guard()?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>, StoreError> {
        let now = Utc::now();
        Ok(self
            .read_guard()?
            .values()
            .find(|u| {
                u.password_reset_token.as_deref() == Some(digest)
                    && u.password_reset_expires.is_some_and(|exp| exp > now)
            })
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.write_guard()?;
        check_unique(&users, &new_user.username, &new_user.email, None)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            profile: new_user.profile,
            permissions: new_user.permissions,
            active: true,
            failed_login_attempts: 0,
            account_locked_at: None,
            last_login: None,
            password_reset_token: None,
            password_reset_expires: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.write_guard()?;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        check_unique(&users, &user.username, &user.email, Some(user.id))?;

        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        users.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.write_guard()?.remove(&id).is_some())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.read_guard()?.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
