//! API endpoints for signing in.
//!
//! Staff (super admins and school admins) and teachers sign in through
//! separate endpoints that set separate cookies. Both check credentials only;
//! account status is enforced later by the dashboard shells.

use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ApiError, api_error, internal_error};
use crate::config::AppConfig;
use crate::device::ClientInfo;
use crate::logged_json::LoggedJson;
use crate::models::{Principal, Role};
use crate::orm::DbConn;
use crate::orm::login::{LoginRequest, process_login};
use crate::session::{SessionKind, SessionManager};

/// Login success response.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginSuccessResponse {
    pub user_id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub school_id: Option<i32>,
}

impl From<&Principal> for LoginSuccessResponse {
    fn from(principal: &Principal) -> Self {
        LoginSuccessResponse {
            user_id: principal.id(),
            email: principal.email().to_string(),
            name: principal.name().to_string(),
            role: principal.role(),
            school_id: principal.school_id(),
        }
    }
}

async fn login_with(
    kind: SessionKind,
    db: &DbConn,
    cookies: &CookieJar<'_>,
    config: &AppConfig,
    login: &LoginRequest,
    client: &ClientInfo,
) -> Result<Json<LoginSuccessResponse>, ApiError> {
    let manager = SessionManager::from_config(kind, config);
    match process_login(db, cookies, &manager, login, client).await {
        Ok(principal) => Ok(Json(LoginSuccessResponse::from(&principal))),
        Err(status) if status == Status::BadRequest => Err(api_error(
            Status::BadRequest,
            "Email and password are required",
        )),
        Err(status) if status == Status::Unauthorized => {
            Err(api_error(Status::Unauthorized, "Invalid credentials"))
        }
        Err(_) => Err(internal_error()),
    }
}

/// Staff login endpoint.
///
/// - **URL:** `/api/1/login`
/// - **Method:** `POST`
/// - **Purpose:** Authenticates a super admin or school admin and sets the `session` cookie
/// - **Authentication:** None required
///
/// Super admins are matched first, then school admins.
///
/// # Request Format
///
/// ```json
/// { "email": "admin@school.example", "password": "Secret123" }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "user_id": 3, "email": "admin@school.example", "name": "Ada", "role": "school_admin", "school_id": 1 }
/// ```
///
/// **Failure (HTTP 400 / 401):**
/// ```json
/// { "error": "Invalid credentials" }
/// ```
#[post("/1/login", data = "<login>")]
pub async fn login(
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
    client: ClientInfo,
    login: LoggedJson<LoginRequest>,
) -> Result<Json<LoginSuccessResponse>, ApiError> {
    login_with(SessionKind::Primary, &db, cookies, config, &login, &client).await
}

/// Teacher login endpoint.
///
/// - **URL:** `/api/1/teacher/login`
/// - **Method:** `POST`
/// - **Purpose:** Authenticates a teacher and sets the `teacher_session` cookie
/// - **Authentication:** None required
///
/// Same request and response shapes as `/api/1/login`.
#[post("/1/teacher/login", data = "<login>")]
pub async fn teacher_login(
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
    client: ClientInfo,
    login: LoggedJson<LoginRequest>,
) -> Result<Json<LoginSuccessResponse>, ApiError> {
    login_with(SessionKind::Teacher, &db, cookies, config, &login, &client).await
}

pub fn routes() -> Vec<Route> {
    routes![login, teacher_login]
}
