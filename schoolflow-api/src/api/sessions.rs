//! Active sessions of the signed-in principal, for the security page.

use rocket::Route;
use rocket::http::Status;
use rocket::serde::json::Json;

use super::{ApiError, SuccessResponse, api_error, internal_error};
use crate::models::{ActiveSession, SessionData};
use crate::orm::DbConn;
use crate::orm::session::{delete_principal_session, list_active_sessions, now_millis};
use crate::session_guards::{StaffSession, TeacherSession};

async fn list_for(
    db: &DbConn,
    session: &SessionData,
    current_token: String,
) -> Result<Json<Vec<ActiveSession>>, ApiError> {
    let (role, user_id) = (session.role, session.user_id);
    let rows = db
        .run(move |conn| list_active_sessions(conn, role, user_id, now_millis()))
        .await
        .map_err(|e| {
            error!("[sessions] Failed to list sessions: {}", e);
            internal_error()
        })?;
    Ok(Json(
        rows.into_iter()
            .map(|row| ActiveSession::from_session(row, Some(&current_token)))
            .collect(),
    ))
}

async fn revoke_for(
    db: &DbConn,
    session: &SessionData,
    session_id: i32,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (role, user_id) = (session.role, session.user_id);
    let deleted = db
        .run(move |conn| delete_principal_session(conn, session_id, role, user_id))
        .await
        .map_err(|e| {
            error!("[sessions] Failed to revoke session {}: {}", session_id, e);
            internal_error()
        })?;
    if deleted == 0 {
        return Err(api_error(Status::NotFound, "Session not found"));
    }
    info!("[sessions] {} {} revoked session {}", role, user_id, session_id);
    Ok(SuccessResponse::ok())
}

/// List sessions endpoint.
///
/// - **URL:** `/api/1/sessions`
/// - **Method:** `GET`
/// - **Purpose:** Lists the caller's unexpired sessions with device and IP data
/// - **Authentication:** `session` cookie
///
/// Tokens are never returned; the session making the request has
/// `"current": true`.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// [
///   {
///     "id": 4,
///     "ip_address": "198.51.100.7",
///     "device": "Desktop",
///     "browser": "Firefox 121",
///     "os": "Ubuntu",
///     "device_type": "desktop",
///     "created_at": "2025-03-01T09:12:44",
///     "expires_at": 1741425164000,
///     "current": true
///   }
/// ]
/// ```
#[get("/1/sessions")]
pub async fn list_sessions(
    auth: StaffSession,
    db: DbConn,
) -> Result<Json<Vec<ActiveSession>>, ApiError> {
    list_for(&db, &auth.session, auth.token).await
}

/// Teacher counterpart of `/api/1/sessions`.
#[get("/1/teacher/sessions")]
pub async fn list_teacher_sessions(
    auth: TeacherSession,
    db: DbConn,
) -> Result<Json<Vec<ActiveSession>>, ApiError> {
    list_for(&db, &auth.session, auth.token).await
}

/// Revoke session endpoint.
///
/// - **URL:** `/api/1/sessions/<id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Deletes one of the caller's own sessions
/// - **Authentication:** `session` cookie
///
/// Returns HTTP 404 when the id does not name one of the caller's sessions.
#[delete("/1/sessions/<id>")]
pub async fn revoke_session(
    auth: StaffSession,
    db: DbConn,
    id: i32,
) -> Result<Json<SuccessResponse>, ApiError> {
    revoke_for(&db, &auth.session, id).await
}

/// Teacher counterpart of `DELETE /api/1/sessions/<id>`.
#[delete("/1/teacher/sessions/<id>")]
pub async fn revoke_teacher_session(
    auth: TeacherSession,
    db: DbConn,
    id: i32,
) -> Result<Json<SuccessResponse>, ApiError> {
    revoke_for(&db, &auth.session, id).await
}

pub fn routes() -> Vec<Route> {
    routes![
        list_sessions,
        list_teacher_sessions,
        revoke_session,
        revoke_teacher_session
    ]
}
