//! Password change endpoints.
//!
//! Changing a password does not revoke other sessions of the same account.

use rocket::Route;
use rocket::http::Status;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ApiError, api_error, internal_error};
use crate::logged_json::LoggedJson;
use crate::models::SessionData;
use crate::orm::DbConn;
use crate::orm::login::{hash_password, validate_password, verify_password};
use crate::orm::principal::{find_principal, set_password_hash};
use crate::session_guards::{StaffSession, TeacherSession};

#[derive(Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChangePasswordResponse {
    pub success: bool,
    pub message: String,
}

async fn change_password_for(
    db: &DbConn,
    session: &SessionData,
    request: &ChangePasswordRequest,
) -> Result<Json<ChangePasswordResponse>, ApiError> {
    let (role, user_id) = (session.role, session.user_id);
    let principal = db
        .run(move |conn| find_principal(conn, role, user_id))
        .await
        .map_err(|e| {
            error!("[password] Principal lookup failed: {}", e);
            internal_error()
        })?
        .ok_or_else(|| api_error(Status::Unauthorized, "Unauthorized"))?;

    if !verify_password(&request.current_password, principal.password_hash()) {
        return Err(api_error(
            Status::Unauthorized,
            "Current password is incorrect",
        ));
    }

    let validation = validate_password(&request.new_password);
    if !validation.valid {
        return Err(api_error(Status::BadRequest, &validation.message));
    }

    let new_hash = hash_password(&request.new_password).map_err(|e| {
        error!("[password] Password hashing failed: {}", e);
        internal_error()
    })?;
    db.run(move |conn| set_password_hash(conn, role, user_id, &new_hash))
        .await
        .map_err(|e| {
            error!("[password] Failed to store new hash: {}", e);
            internal_error()
        })?;

    info!("[password] {} {} changed their password", role, user_id);
    Ok(Json(ChangePasswordResponse {
        success: true,
        message: "Password updated".to_string(),
    }))
}

/// Change password endpoint.
///
/// - **URL:** `/api/1/change-password`
/// - **Method:** `POST`
/// - **Purpose:** Replaces the signed-in staff member's password
/// - **Authentication:** `session` cookie
///
/// # Request Format
///
/// ```json
/// { "current_password": "OldSecret1", "new_password": "NewSecret2" }
/// ```
///
/// # Response
///
/// - HTTP 200 `{ "success": true, "message": "Password updated" }`
/// - HTTP 401 when the current password is wrong or there is no session
/// - HTTP 400 with the validation message when the new password is too weak
#[post("/1/change-password", data = "<request>")]
pub async fn change_password(
    auth: StaffSession,
    db: DbConn,
    request: LoggedJson<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>, ApiError> {
    change_password_for(&db, &auth.session, &request).await
}

/// Teacher counterpart of `/api/1/change-password`.
#[post("/1/teacher/change-password", data = "<request>")]
pub async fn teacher_change_password(
    auth: TeacherSession,
    db: DbConn,
    request: LoggedJson<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>, ApiError> {
    change_password_for(&db, &auth.session, &request).await
}

pub fn routes() -> Vec<Route> {
    routes![change_password, teacher_change_password]
}
