//! Live account status of the signed-in principal.
//!
//! Status comes from the principal's own table at the time of the request,
//! never from the session row.

use rocket::Route;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ApiError, internal_error};
use crate::models::{AccountStatus, Role};
use crate::orm::principal::find_principal;
use crate::orm::{DbConn, DbRunner};
use crate::session_guards::{StaffSession, TeacherSession};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountStatusResponse {
    pub role: Role,
    pub status: AccountStatus,
}

/// Reads a principal's current status; `None` when the row no longer exists.
pub async fn live_status<D: DbRunner>(
    db: &D,
    role: Role,
    user_id: i32,
) -> Result<Option<AccountStatus>, diesel::result::Error> {
    db.run(move |conn| find_principal(conn, role, user_id))
        .await
        .map(|principal| principal.map(|p| p.status()))
}

async fn account_status_for(
    db: &DbConn,
    role: Role,
    user_id: i32,
) -> Result<Json<AccountStatusResponse>, ApiError> {
    let status = live_status(db, role, user_id).await.map_err(|e| {
        error!("[account] Status lookup failed: {}", e);
        internal_error()
    })?;
    Ok(Json(AccountStatusResponse {
        role,
        status: status.unwrap_or(AccountStatus::Deleted),
    }))
}

/// Account status endpoint.
///
/// - **URL:** `/api/1/account/status`
/// - **Method:** `GET`
/// - **Purpose:** Returns the live status of the staff member behind the `session` cookie
/// - **Authentication:** `session` cookie
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "role": "school_admin", "status": "suspended" }
/// ```
#[get("/1/account/status")]
pub async fn account_status(
    auth: StaffSession,
    db: DbConn,
) -> Result<Json<AccountStatusResponse>, ApiError> {
    account_status_for(&db, auth.session.role, auth.session.user_id).await
}

/// Teacher counterpart of `/api/1/account/status`.
#[get("/1/teacher/account/status")]
pub async fn teacher_account_status(
    auth: TeacherSession,
    db: DbConn,
) -> Result<Json<AccountStatusResponse>, ApiError> {
    account_status_for(&db, auth.session.role, auth.session.user_id).await
}

pub fn routes() -> Vec<Route> {
    routes![account_status, teacher_account_status]
}
