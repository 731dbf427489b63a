//! User domain model: roles, permissions, and the account record.
//!
//! The permission set is a snapshot computed from the role when the
//! account is created. A later role change does not recompute it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// User role determining the default permission set and which profile
/// fields are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Applicant,
    Recruiter,
    Admin,
    HiringManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
            Role::HiringManager => "hiring_manager",
        }
    }

    /// Permission set granted to this role at account creation.
    pub fn default_permissions(&self) -> Vec<Permission> {
        use Permission::*;
        match self {
            Role::Admin => vec![
                PostJob,
                EditJob,
                DeleteJob,
                ViewJob,
                ReviewApplication,
                ManagePipeline,
                ScheduleInterview,
                SendOffer,
                ViewAnalytics,
                ManageUsers,
            ],
            Role::Recruiter | Role::HiringManager => vec![
                PostJob,
                EditJob,
                ViewJob,
                ReviewApplication,
                ManagePipeline,
                ScheduleInterview,
                SendOffer,
            ],
            Role::Applicant => vec![
                ViewJob,
                SubmitApplication,
                ViewApplicationStatus,
                WithdrawApplication,
            ],
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applicant" => Ok(Role::Applicant),
            "recruiter" => Ok(Role::Recruiter),
            "admin" => Ok(Role::Admin),
            "hiring_manager" => Ok(Role::HiringManager),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained capability gating a specific action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    PostJob,
    EditJob,
    DeleteJob,
    ViewJob,
    ReviewApplication,
    ManagePipeline,
    ScheduleInterview,
    SendOffer,
    ViewAnalytics,
    ManageUsers,
    SubmitApplication,
    ViewApplicationStatus,
    WithdrawApplication,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::PostJob => "post_job",
            Permission::EditJob => "edit_job",
            Permission::DeleteJob => "delete_job",
            Permission::ViewJob => "view_job",
            Permission::ReviewApplication => "review_application",
            Permission::ManagePipeline => "manage_pipeline",
            Permission::ScheduleInterview => "schedule_interview",
            Permission::SendOffer => "send_offer",
            Permission::ViewAnalytics => "view_analytics",
            Permission::ManageUsers => "manage_users",
            Permission::SubmitApplication => "submit_application",
            Permission::ViewApplicationStatus => "view_application_status",
            Permission::WithdrawApplication => "withdraw_application",
        }
    }
}

impl FromStr for Permission {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post_job" => Ok(Permission::PostJob),
            "edit_job" => Ok(Permission::EditJob),
            "delete_job" => Ok(Permission::DeleteJob),
            "view_job" => Ok(Permission::ViewJob),
            "review_application" => Ok(Permission::ReviewApplication),
            "manage_pipeline" => Ok(Permission::ManagePipeline),
            "schedule_interview" => Ok(Permission::ScheduleInterview),
            "send_offer" => Ok(Permission::SendOffer),
            "view_analytics" => Ok(Permission::ViewAnalytics),
            "manage_users" => Ok(Permission::ManageUsers),
            "submit_application" => Ok(Permission::SubmitApplication),
            "view_application_status" => Ok(Permission::ViewApplicationStatus),
            "withdraw_application" => Ok(Permission::WithdrawApplication),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role-conditional field requirement that was not met.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProfileFieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Role plus the profile fields that role requires.
///
/// Modeled as a tagged union so "department is required for recruiters
/// and admins" is enforced by construction rather than checked at
/// every write site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleProfile {
    Applicant,
    Admin {
        department: String,
    },
    Recruiter {
        department: String,
        position: String,
        company: String,
    },
    HiringManager {
        position: String,
        company: String,
    },
}

impl RoleProfile {
    /// Assemble a profile from a role and the optional conditional
    /// fields. Fields the role does not use are dropped; fields it
    /// requires but which are absent produce an error naming the field.
    pub fn from_parts(
        role: Role,
        department: Option<String>,
        position: Option<String>,
        company: Option<String>,
    ) -> Result<Self, ProfileFieldError> {
        let require = |value: Option<String>, field: &'static str, message: &'static str| {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or(ProfileFieldError { field, message })
        };

        match role {
            Role::Applicant => Ok(RoleProfile::Applicant),
            Role::Admin => Ok(RoleProfile::Admin {
                department: require(
                    department,
                    "department",
                    "Department is required for recruiters and admins",
                )?,
            }),
            Role::Recruiter => Ok(RoleProfile::Recruiter {
                department: require(
                    department,
                    "department",
                    "Department is required for recruiters and admins",
                )?,
                position: require(
                    position,
                    "position",
                    "Position is required for recruiters and hiring managers",
                )?,
                company: require(
                    company,
                    "company",
                    "Company is required for recruiters and hiring managers",
                )?,
            }),
            Role::HiringManager => Ok(RoleProfile::HiringManager {
                position: require(
                    position,
                    "position",
                    "Position is required for recruiters and hiring managers",
                )?,
                company: require(
                    company,
                    "company",
                    "Company is required for recruiters and hiring managers",
                )?,
            }),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Applicant => Role::Applicant,
            RoleProfile::Admin { .. } => Role::Admin,
            RoleProfile::Recruiter { .. } => Role::Recruiter,
            RoleProfile::HiringManager { .. } => Role::HiringManager,
        }
    }

    pub fn department(&self) -> Option<&str> {
        match self {
            RoleProfile::Admin { department } | RoleProfile::Recruiter { department, .. } => {
                Some(department)
            }
            _ => None,
        }
    }

    pub fn position(&self) -> Option<&str> {
        match self {
            RoleProfile::Recruiter { position, .. }
            | RoleProfile::HiringManager { position, .. } => Some(position),
            _ => None,
        }
    }

    pub fn company(&self) -> Option<&str> {
        match self {
            RoleProfile::Recruiter { company, .. } | RoleProfile::HiringManager { company, .. } => {
                Some(company)
            }
            _ => None,
        }
    }
}

/// Full account record as held by the store. Never serialized outward;
/// responses go through [`PublicUser`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    /// Stored lowercased; unique case-insensitively.
    pub username: String,
    /// Stored lowercased; unique case-insensitively.
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub profile: RoleProfile,
    /// Snapshot taken from the role at creation.
    pub permissions: Vec<Permission>,
    pub active: bool,
    pub failed_login_attempts: u32,
    pub account_locked_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    /// SHA-256 hex digest of the raw reset secret, never the secret itself.
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    /// Incremented to invalidate all previously issued tokens.
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Whether the account is inside an active lockout window.
    pub fn is_locked(&self, lockout_duration_secs: i64) -> bool {
        match self.account_locked_at {
            Some(locked_at) => Utc::now() < locked_at + Duration::seconds(lockout_duration_secs),
            None => false,
        }
    }

    /// Record a failed login; lock the account once the threshold is hit.
    pub fn record_failed_login(&mut self, max_attempts: u32) {
        self.failed_login_attempts += 1;
        if self.failed_login_attempts >= max_attempts && self.account_locked_at.is_none() {
            self.account_locked_at = Some(Utc::now());
        }
    }

    /// Clear lockout bookkeeping (successful login or password reset).
    pub fn clear_lockout(&mut self) {
        self.failed_login_attempts = 0;
        self.account_locked_at = None;
    }

    /// Invalidate every token issued before this call.
    pub fn bump_version(&mut self) {
        self.version += 1;
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            profile: self.profile.clone(),
            permissions: self.permissions.clone(),
            last_login: self.last_login,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for creating an account. The store assigns id, version 1,
/// the active flag, and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub profile: RoleProfile,
    pub permissions: Vec<Permission>,
}

/// Outward-facing view of an account: no hash, no lockout or reset
/// bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub profile: RoleProfile,
    pub permissions: Vec<Permission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
