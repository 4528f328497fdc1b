use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The kind of principal a session belongs to.
///
/// Each variant is backed by its own table; the session row carries the role
/// as the discriminant that selects which table governs the principal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    SuperAdmin,
    SchoolAdmin,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::SchoolAdmin, Role::Teacher];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::SchoolAdmin => "school_admin",
            Role::Teacher => "teacher",
        }
    }

    /// Login page a principal of this role is sent to when a shell rejects them.
    pub fn login_path(&self) -> &'static str {
        match self {
            Role::SuperAdmin | Role::SchoolAdmin => "/login",
            Role::Teacher => "/teacher/login",
        }
    }

    /// Whether a dashboard shell for this role re-checks the live account status.
    pub fn requires_status_check(&self) -> bool {
        match self {
            Role::SuperAdmin => false,
            Role::SchoolAdmin | Role::Teacher => true,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "school_admin" => Ok(Role::SchoolAdmin),
            "teacher" => Ok(Role::Teacher),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Lifecycle state stored on every principal record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AccountStatus {
    Active,
    Pending,
    Suspended,
    Inactive,
    Deleted,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Pending => "pending",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Deleted => "deleted",
        }
    }

    /// Statuses that keep a principal out of its dashboard even with a valid session.
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            AccountStatus::Suspended | AccountStatus::Inactive | AccountStatus::Deleted
        )
    }

    /// Human-readable explanation shown on the access-blocked page.
    pub fn block_reason(&self) -> Option<&'static str> {
        match self {
            AccountStatus::Suspended => Some("Your account has been suspended"),
            AccountStatus::Inactive => Some("Your account is inactive"),
            AccountStatus::Deleted => Some("Your account has been deleted"),
            AccountStatus::Active | AccountStatus::Pending => None,
        }
    }

    /// Parses a stored status, treating anything unrecognised as inactive.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or(AccountStatus::Inactive)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "pending" => Ok(AccountStatus::Pending),
            "suspended" => Ok(AccountStatus::Suspended),
            "inactive" => Ok(AccountStatus::Inactive),
            "deleted" => Ok(AccountStatus::Deleted),
            other => Err(format!("unknown account status '{}'", other)),
        }
    }
}
