//! Server-side shell check for the dashboard areas.

use rocket::http::CookieJar;
use rocket::serde::json::Json;
use rocket::{Route, State};

use super::account::live_status;
use crate::config::AppConfig;
use crate::orm::DbConn;
use crate::session::{SessionKind, SessionManager};
use crate::shell::{ShellArea, ShellOutcome, check_shell};

/// Shell check endpoint.
///
/// - **URL:** `/api/1/shell/<area>` where `<area>` is `super-admin`,
///   `school-admin` or `teacher`
/// - **Method:** `GET`
/// - **Purpose:** Tells a dashboard shell whether to render or where to go instead
/// - **Authentication:** None required; reads the cookie belonging to the area
///
/// A status lookup failure is treated like a missing account, so the shell
/// is sent to the access-blocked page rather than rendered.
///
/// # Response
///
/// **Always HTTP 200 OK:**
/// ```json
/// { "action": "render" }
/// ```
/// ```json
/// { "action": "redirect", "location": "/access-blocked?reason=Your%20account%20has%20been%20suspended&status=suspended" }
/// ```
#[get("/1/shell/<area>")]
pub async fn shell_check(
    area: ShellArea,
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
) -> Json<ShellOutcome> {
    let required = area.role();
    let manager = SessionManager::from_config(SessionKind::for_role(required), config);
    let session = manager.get_session(cookies, &db).await;

    let status = match &session {
        Some(session) if session.role == required && required.requires_status_check() => {
            live_status(&db, session.role, session.user_id)
                .await
                .unwrap_or_else(|e| {
                    error!("[shell] Status lookup failed: {}", e);
                    None
                })
        }
        _ => None,
    };

    Json(check_shell(required, session.as_ref(), status))
}

pub fn routes() -> Vec<Route> {
    routes![shell_check]
}
