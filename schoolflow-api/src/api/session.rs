//! Session check endpoints polled by the client to hydrate its auth state.

use rocket::Route;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::SessionData;
use crate::session_guards::{StaffSession, TeacherSession};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionCheckResponse {
    pub authenticated: bool,
    pub session: Option<SessionData>,
}

fn session_check(session: Option<SessionData>) -> Custom<Json<SessionCheckResponse>> {
    match session {
        Some(session) => Custom(
            Status::Ok,
            Json(SessionCheckResponse {
                authenticated: true,
                session: Some(session),
            }),
        ),
        None => Custom(
            Status::Unauthorized,
            Json(SessionCheckResponse {
                authenticated: false,
                session: None,
            }),
        ),
    }
}

/// Session check endpoint.
///
/// - **URL:** `/api/1/session`
/// - **Method:** `GET`
/// - **Purpose:** Reports the session behind the `session` cookie
/// - **Authentication:** None required
///
/// # Response
///
/// **Authenticated (HTTP 200 OK):**
/// ```json
/// {
///   "authenticated": true,
///   "session": { "user_id": 3, "email": "admin@school.example", "role": "school_admin", "school_id": 1 }
/// }
/// ```
///
/// **Unauthenticated (HTTP 401 Unauthorized):**
/// ```json
/// { "authenticated": false, "session": null }
/// ```
#[get("/1/session")]
pub fn check_session(auth: Option<StaffSession>) -> Custom<Json<SessionCheckResponse>> {
    session_check(auth.map(|auth| auth.session))
}

/// Teacher session check; the `teacher_session` counterpart of `/api/1/session`.
#[get("/1/teacher/session")]
pub fn check_teacher_session(auth: Option<TeacherSession>) -> Custom<Json<SessionCheckResponse>> {
    session_check(auth.map(|auth| auth.session))
}

pub fn routes() -> Vec<Route> {
    routes![check_session, check_teacher_session]
}
