//! PostgreSQL-backed user store.

use crate::models::{NewUser, Permission, Role, RoleProfile, User};
use crate::repositories::{StoreError, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
     role, department, position, company, permissions, active, \
     failed_login_attempts, account_locked_at, last_login, \
     password_reset_token, password_reset_expires, version, created_at, updated_at";

/// Raw user row; converted into the domain record after fetching.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    role: String,
    department: Option<String>,
    position: Option<String>,
    company: Option<String>,
    permissions: Vec<String>,
    active: bool,
    failed_login_attempts: i32,
    account_locked_at: Option<DateTime<Utc>>,
    last_login: Option<DateTime<Utc>>,
    password_reset_token: Option<String>,
    password_reset_expires: Option<DateTime<Utc>>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, StoreError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown role {:?} for user {}", self.role, self.id))?;
        let profile = RoleProfile::from_parts(role, self.department, self.position, self.company)
            .map_err(|e| anyhow::anyhow!("user {} violates role invariant: {}", self.id, e))?;
        let permissions = self
            .permissions
            .iter()
            .map(|p| {
                p.parse::<Permission>().map_err(|_| {
                    anyhow::anyhow!("unknown permission {:?} for user {}", p, self.id)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            profile,
            permissions,
            active: self.active,
            failed_login_attempts: self.failed_login_attempts.max(0) as u32,
            account_locked_at: self.account_locked_at,
            last_login: self.last_login,
            password_reset_token: self.password_reset_token,
            password_reset_expires: self.password_reset_expires,
            version: self.version.max(0) as u32,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Map unique-index violations to [`StoreError::Duplicate`] naming the
/// conflicting field; everything else passes through.
fn map_unique_violation(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = e {
        if db.code().as_deref() == Some("23505") {
            let field = match db.constraint() {
                Some("users_email_key") => "email",
                Some("users_username_key") => "username",
                _ => "credential",
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(e)
}

fn permission_strings(permissions: &[Permission]) -> Vec<String> {
    permissions.iter().map(|p| p.as_str().to_string()).collect()
}

/// User store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_optional(&self, sql: &str, bind: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        self.fetch_optional(&sql, email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        self.fetch_optional(&sql, username).await
    }

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE password_reset_token = $1 AND password_reset_expires > NOW()"
        );
        self.fetch_optional(&sql, digest).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name,
                               role, department, position, company, permissions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        );
        let role = new_user.profile.role();
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(role.as_str())
            .bind(new_user.profile.department())
            .bind(new_user.profile.position())
            .bind(new_user.profile.company())
            .bind(permission_strings(&new_user.permissions))
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        row.into_user()
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            UPDATE users SET
                username = $2,
                email = $3,
                password_hash = $4,
                first_name = $5,
                last_name = $6,
                role = $7,
                department = $8,
                position = $9,
                company = $10,
                permissions = $11,
                active = $12,
                failed_login_attempts = $13,
                account_locked_at = $14,
                last_login = $15,
                password_reset_token = $16,
                password_reset_expires = $17,
                version = $18,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role().as_str())
            .bind(user.profile.department())
            .bind(user.profile.position())
            .bind(user.profile.company())
            .bind(permission_strings(&user.permissions))
            .bind(user.active)
            .bind(user.failed_login_attempts as i32)
            .bind(user.account_locked_at)
            .bind(user.last_login)
            .bind(&user.password_reset_token)
            .bind(user.password_reset_expires)
            .bind(user.version as i32)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => StoreError::NotFound,
                e => map_unique_violation(e),
            })?;
        row.into_user()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
