//! School self-registration.
//!
//! Registering creates a school on trial (`pending`) together with its first
//! school admin (`active`) in one transaction, then signs that admin in.

use diesel::prelude::*;
use rocket::http::{CookieJar, Status};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ApiError, api_error, internal_error};
use crate::config::AppConfig;
use crate::device::ClientInfo;
use crate::logged_json::LoggedJson;
use crate::models::{AccountStatus, Principal, PrincipalInput, Role, School, SessionData};
use crate::orm::DbConn;
use crate::orm::login::{create_and_store_session, hash_password, validate_password};
use crate::orm::principal::{email_in_use, insert_principal};
use crate::orm::school::{TRIAL_STATUS, insert_school};
use crate::session::{SessionKind, SessionManager};

#[derive(Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct RegisterRequest {
    pub school_name: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct RegisterResponse {
    pub school: School,
    pub session: SessionData,
}

enum RegisterFailure {
    EmailTaken,
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for RegisterFailure {
    fn from(e: diesel::result::Error) -> Self {
        RegisterFailure::Database(e)
    }
}

fn create_school_with_admin(
    conn: &mut SqliteConnection,
    school_name: &str,
    admin: PrincipalInput,
) -> Result<(School, Principal), RegisterFailure> {
    conn.transaction(|conn| {
        if email_in_use(conn, &admin.email)? {
            return Err(RegisterFailure::EmailTaken);
        }
        let school = insert_school(conn, school_name, TRIAL_STATUS)?;
        let principal = insert_principal(
            conn,
            PrincipalInput {
                school_id: Some(school.id),
                ..admin
            },
        )?;
        Ok((school, principal))
    })
}

/// Registration endpoint.
///
/// - **URL:** `/api/1/register`
/// - **Method:** `POST`
/// - **Purpose:** Creates a school and its first school admin, and signs the admin in
/// - **Authentication:** None required
///
/// # Request Format
///
/// ```json
/// { "school_name": "Hillside High", "name": "Ada", "email": "ada@hillside.example", "password": "Secret123" }
/// ```
///
/// # Response
///
/// **Success (HTTP 201 Created):** the new school and the session, with the
/// `session` cookie set.
///
/// **Failure:**
/// - HTTP 400 when a field is empty or the password fails validation
/// - HTTP 409 when the email is already registered
#[post("/1/register", data = "<request>")]
pub async fn register(
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
    client: ClientInfo,
    request: LoggedJson<RegisterRequest>,
) -> Result<status::Created<Json<RegisterResponse>>, ApiError> {
    let request = request.into_inner();
    let school_name = request.school_name.trim().to_string();
    let name = request.name.trim().to_string();
    let email = request.email.trim().to_string();
    if school_name.is_empty() || name.is_empty() || email.is_empty() {
        return Err(api_error(
            Status::BadRequest,
            "School name, name and email are required",
        ));
    }

    let validation = validate_password(&request.password);
    if !validation.valid {
        return Err(api_error(Status::BadRequest, &validation.message));
    }

    let password_hash = hash_password(&request.password).map_err(|e| {
        error!("[register] Password hashing failed: {}", e);
        internal_error()
    })?;

    let admin = PrincipalInput {
        role: Role::SchoolAdmin,
        email,
        name,
        password_hash,
        status: AccountStatus::Active,
        school_id: None,
    };
    let (school, principal) = match db
        .run(move |conn| create_school_with_admin(conn, &school_name, admin))
        .await
    {
        Ok(created) => created,
        Err(RegisterFailure::EmailTaken) => {
            return Err(api_error(Status::Conflict, "Email already registered"));
        }
        Err(RegisterFailure::Database(e)) => {
            error!("[register] Failed to create school: {}", e);
            return Err(internal_error());
        }
    };

    let token = create_and_store_session(&db, &principal, &client)
        .await
        .map_err(|_| internal_error())?;
    SessionManager::from_config(SessionKind::Primary, config).set_session_cookie(cookies, &token);

    info!(
        "[register] School {} '{}' registered by {}",
        school.id,
        school.name,
        principal.email()
    );

    let session = SessionData {
        user_id: principal.id(),
        email: principal.email().to_string(),
        role: principal.role(),
        school_id: principal.school_id(),
    };
    Ok(status::Created::new("/").body(Json(RegisterResponse { school, session })))
}

pub fn routes() -> Vec<Route> {
    routes![register]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::school::list_schools;
    use crate::orm::testing::setup_test_db;

    fn admin(email: &str) -> PrincipalInput {
        PrincipalInput {
            role: Role::SchoolAdmin,
            email: email.to_string(),
            name: "Ada".to_string(),
            password_hash: "hash".to_string(),
            status: AccountStatus::Active,
            school_id: None,
        }
    }

    #[test]
    fn test_school_starts_on_trial_with_active_admin() {
        let mut conn = setup_test_db();
        let (school, principal) =
            create_school_with_admin(&mut conn, "Hillside", admin("ada@hillside.test"))
                .ok()
                .expect("registration should succeed");

        assert_eq!(school.status, TRIAL_STATUS);
        assert_eq!(principal.role(), Role::SchoolAdmin);
        assert_eq!(principal.status(), AccountStatus::Active);
        assert_eq!(principal.school_id(), Some(school.id));
    }

    #[test]
    fn test_duplicate_email_rolls_back() {
        let mut conn = setup_test_db();
        assert!(create_school_with_admin(&mut conn, "First", admin("dup@sf.test")).is_ok());

        let second = create_school_with_admin(&mut conn, "Second", admin("dup@sf.test"));
        assert!(matches!(second, Err(RegisterFailure::EmailTaken)));
        assert_eq!(list_schools(&mut conn).unwrap().len(), 1);
    }
}
