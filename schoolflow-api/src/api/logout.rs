//! API endpoints for signing out.

use rocket::http::CookieJar;
use rocket::serde::json::Json;
use rocket::{Route, State};

use super::SuccessResponse;
use crate::config::AppConfig;
use crate::orm::session::delete_session;
use crate::orm::{DbConn, DbRunner};
use crate::session::{SessionKind, SessionManager};

/// Deletes the session row behind the cookie (if any) and clears the cookie.
///
/// Succeeds whether or not a session existed. A failed delete is logged and
/// the cookie is still cleared.
pub async fn logout_with<D: DbRunner>(
    manager: &SessionManager,
    db: &D,
    cookies: &CookieJar<'_>,
) -> Json<SuccessResponse> {
    if let Some(token) = manager.get_session_token(cookies) {
        if let Err(e) = db.run(move |conn| delete_session(conn, &token)).await {
            error!("[logout] Failed to delete session row: {}", e);
        }
    }
    manager.clear_session(cookies);
    SuccessResponse::ok()
}

/// Staff logout endpoint.
///
/// - **URL:** `/api/1/logout`
/// - **Method:** `POST`
/// - **Purpose:** Deletes the current session and removes the `session` cookie
/// - **Authentication:** None required (works with or without a valid session)
///
/// # Response
///
/// **Always HTTP 200 OK:**
/// ```json
/// { "success": true }
/// ```
#[post("/1/logout")]
pub async fn logout(
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
) -> Json<SuccessResponse> {
    let manager = SessionManager::from_config(SessionKind::Primary, config);
    logout_with(&manager, &db, cookies).await
}

/// Teacher logout endpoint; the `teacher_session` counterpart of `/api/1/logout`.
#[post("/1/teacher/logout")]
pub async fn teacher_logout(
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
) -> Json<SuccessResponse> {
    let manager = SessionManager::from_config(SessionKind::Teacher, config);
    logout_with(&manager, &db, cookies).await
}

pub fn routes() -> Vec<Route> {
    routes![logout, teacher_logout]
}
