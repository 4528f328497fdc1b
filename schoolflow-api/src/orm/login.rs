//! Credential checks and session creation for the login endpoints.
//!
//! This module holds the password manager (Argon2 hashing, verification and
//! strength validation) and the login workflow that ties a verified
//! principal to a fresh session row and cookie.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rocket::http::{CookieJar, Status};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::device::ClientInfo;
use crate::models::{Principal, Role};
use crate::orm::DbRunner;
use crate::orm::principal::{find_principal_by_email, find_staff_by_email};
use crate::orm::session::{create_session, new_session_for};
use crate::session::{SessionKind, SessionManager};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Login request structure containing user credentials.
#[derive(Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Outcome of a password strength check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PasswordValidation {
    pub valid: bool,
    pub message: String,
}

impl PasswordValidation {
    fn rejected(message: &str) -> Self {
        PasswordValidation {
            valid: false,
            message: message.to_string(),
        }
    }
}

/// Checks a new password against the account password policy.
pub fn validate_password(password: &str) -> PasswordValidation {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return PasswordValidation::rejected("Password must be at least 8 characters long");
    }
    if length > MAX_PASSWORD_LENGTH {
        return PasswordValidation::rejected("Password must be at most 128 characters long");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return PasswordValidation::rejected("Password must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return PasswordValidation::rejected("Password must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return PasswordValidation::rejected("Password must contain a number");
    }
    PasswordValidation {
        valid: true,
        message: "Password meets requirements".to_string(),
    }
}

/// Hashes a password using Argon2 with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verifies a password against a stored Argon2 hash.
///
/// A stored hash that cannot be parsed never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Finds the principal that may log in through the given cookie's portal.
async fn find_login_principal<D: DbRunner>(
    db: &D,
    kind: SessionKind,
    email: &str,
) -> Result<Option<Principal>, Status> {
    let email = email.trim().to_owned();
    db.run(move |conn| match kind {
        SessionKind::Primary => find_staff_by_email(conn, &email),
        SessionKind::Teacher => find_principal_by_email(conn, Role::Teacher, &email),
    })
    .await
    .map_err(|e| {
        error!("[login] Principal lookup failed: {}", e);
        Status::InternalServerError
    })
}

/// Creates a session row for `principal` and returns its token.
pub async fn create_and_store_session<D: DbRunner>(
    db: &D,
    principal: &Principal,
    client: &ClientInfo,
) -> Result<String, Status> {
    let new_session = new_session_for(principal, client);
    db.run(move |conn| create_session(conn, &new_session))
        .await
        .map_err(|e| {
            error!("[login] Failed to store session: {}", e);
            Status::InternalServerError
        })
}

/// Processes a complete login: validates input, checks credentials, creates
/// a session and sets the cookie owned by `manager`.
///
/// Only credentials are checked. A suspended or deleted principal still gets
/// a session; the dashboard shells enforce account status.
///
/// # Returns
/// * `Ok(Principal)` - Login successful, cookie set
/// * `Err(Status::BadRequest)` - Empty email or password
/// * `Err(Status::Unauthorized)` - Unknown email or wrong password
/// * `Err(Status::InternalServerError)` - Database operation failed
pub async fn process_login<D: DbRunner>(
    db: &D,
    cookies: &CookieJar<'_>,
    manager: &SessionManager,
    login: &LoginRequest,
    client: &ClientInfo,
) -> Result<Principal, Status> {
    if login.email.trim().is_empty() || login.password.is_empty() {
        return Err(Status::BadRequest);
    }

    let principal = match find_login_principal(db, manager.kind(), &login.email).await? {
        Some(principal) => principal,
        None => return Err(Status::Unauthorized),
    };

    if !verify_password(&login.password, principal.password_hash()) {
        return Err(Status::Unauthorized);
    }

    let token = create_and_store_session(db, &principal, client).await?;
    manager.set_session_cookie(cookies, &token);

    info!(
        "[login] {} {} signed in from {} ({})",
        principal.role(),
        principal.id(),
        client.ip_address,
        client.device.browser
    );
    Ok(principal)
}
