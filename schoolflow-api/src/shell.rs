//! Status-aware check run by each authenticated dashboard shell.
//!
//! The route guard only proves that a session exists and carries the right
//! role for the path prefix. A shell additionally needs the principal's
//! *live* account status, so a school admin suspended after signing in is
//! turned away on the next check even though the session is still valid.
//!
//! [`check_shell`] is pure; callers supply the resolved session and the
//! status read from the principal's table at the time of the check.

use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::{AccountStatus, Role, SessionData};

pub const ACCESS_BLOCKED_PATH: &str = "/access-blocked";

/// What a shell should do after its session check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export)]
pub enum ShellOutcome {
    Render,
    Redirect { location: String },
}

impl ShellOutcome {
    pub fn redirect(location: impl Into<String>) -> Self {
        ShellOutcome::Redirect {
            location: location.into(),
        }
    }
}

/// The three authenticated dashboard areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellArea {
    SuperAdmin,
    SchoolAdmin,
    Teacher,
}

impl ShellArea {
    pub fn role(&self) -> Role {
        match self {
            ShellArea::SuperAdmin => Role::SuperAdmin,
            ShellArea::SchoolAdmin => Role::SchoolAdmin,
            ShellArea::Teacher => Role::Teacher,
        }
    }
}

impl<'a> FromParam<'a> for ShellArea {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        match param {
            "super-admin" => Ok(ShellArea::SuperAdmin),
            "school-admin" => Ok(ShellArea::SchoolAdmin),
            "teacher" => Ok(ShellArea::Teacher),
            _ => Err(param),
        }
    }
}

/// The access-blocked page URL for a blocked status.
pub fn access_blocked_location(status: AccountStatus) -> String {
    let reason = status.block_reason().unwrap_or("Your account is not active");
    format!(
        "{}?reason={}&status={}",
        ACCESS_BLOCKED_PATH,
        urlencoding::encode(reason),
        status.as_str()
    )
}

/// Decides whether the shell for `required` may render.
///
/// `live_status` is `None` when the principal row no longer exists, which is
/// treated the same as a deleted account. Super admin shells skip the status
/// step entirely.
pub fn check_shell(
    required: Role,
    session: Option<&SessionData>,
    live_status: Option<AccountStatus>,
) -> ShellOutcome {
    let Some(session) = session else {
        return ShellOutcome::redirect(required.login_path());
    };
    if session.role != required {
        return ShellOutcome::redirect(required.login_path());
    }
    if !required.requires_status_check() {
        return ShellOutcome::Render;
    }

    let status = live_status.unwrap_or(AccountStatus::Deleted);
    if status.is_blocked() {
        ShellOutcome::redirect(access_blocked_location(status))
    } else {
        ShellOutcome::Render
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> SessionData {
        SessionData {
            user_id: 7,
            email: "someone@sf.test".to_string(),
            role,
            school_id: match role {
                Role::SuperAdmin => None,
                Role::SchoolAdmin | Role::Teacher => Some(1),
            },
        }
    }

    #[test]
    fn test_unauthenticated_goes_to_matching_login() {
        assert_eq!(
            check_shell(Role::Teacher, None, None),
            ShellOutcome::redirect("/teacher/login")
        );
        assert_eq!(
            check_shell(Role::SchoolAdmin, None, None),
            ShellOutcome::redirect("/login")
        );
    }

    #[test]
    fn test_role_mismatch_goes_to_login() {
        let teacher = session(Role::Teacher);
        assert_eq!(
            check_shell(Role::SchoolAdmin, Some(&teacher), Some(AccountStatus::Active)),
            ShellOutcome::redirect("/login")
        );
    }

    #[test]
    fn test_suspended_school_admin_is_blocked() {
        let admin = session(Role::SchoolAdmin);
        let outcome = check_shell(Role::SchoolAdmin, Some(&admin), Some(AccountStatus::Suspended));
        assert_eq!(
            outcome,
            ShellOutcome::redirect(
                "/access-blocked?reason=Your%20account%20has%20been%20suspended&status=suspended"
            )
        );
    }

    #[test]
    fn test_missing_principal_counts_as_deleted() {
        let teacher = session(Role::Teacher);
        match check_shell(Role::Teacher, Some(&teacher), None) {
            ShellOutcome::Redirect { location } => assert!(location.ends_with("status=deleted")),
            ShellOutcome::Render => panic!("missing principal must not render"),
        }
    }

    #[test]
    fn test_active_and_pending_render() {
        let admin = session(Role::SchoolAdmin);
        assert_eq!(
            check_shell(Role::SchoolAdmin, Some(&admin), Some(AccountStatus::Active)),
            ShellOutcome::Render
        );
        assert_eq!(
            check_shell(Role::SchoolAdmin, Some(&admin), Some(AccountStatus::Pending)),
            ShellOutcome::Render
        );
    }

    #[test]
    fn test_super_admin_skips_status() {
        let root = session(Role::SuperAdmin);
        assert_eq!(
            check_shell(Role::SuperAdmin, Some(&root), Some(AccountStatus::Suspended)),
            ShellOutcome::Render
        );
    }

    #[test]
    fn test_area_params() {
        assert_eq!(ShellArea::from_param("school-admin"), Ok(ShellArea::SchoolAdmin));
        assert_eq!(ShellArea::from_param("teacher").map(|a| a.role()), Ok(Role::Teacher));
        assert!(ShellArea::from_param("students").is_err());
    }
}
