//! Session store: persistence of session records keyed by opaque token.
//!
//! Expiry is passive. No job deletes expired rows, so every read in this
//! module filters on `expires_at` and callers never see an expired session.

use chrono::{Duration, Utc};
use diesel::prelude::*;
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::device::ClientInfo;
use crate::models::{NewSession, Principal, Role, Session, SessionData};
use crate::orm::principal::find_principal;
use crate::schema::sessions;

/// Lifetime of a session, fixed when the session is created.
pub const SESSION_TTL_DAYS: i64 = 7;

const TOKEN_LENGTH: usize = 48;

/// Generates a new opaque session token.
///
/// The token is a random alphanumeric string with no decodable structure; it
/// is only ever used as a lookup key.
pub fn generate_session_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Current time in epoch milliseconds, the unit `expires_at` is stored in.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Builds the session row for a principal that just authenticated.
pub fn new_session_for(principal: &Principal, client: &ClientInfo) -> NewSession {
    let now = Utc::now();
    NewSession {
        token: generate_session_token(),
        user_id: principal.id(),
        role: principal.role().as_str().to_string(),
        school_id: principal.school_id(),
        ip_address: client.ip_address.clone(),
        device: client.device.device.clone(),
        browser: client.device.browser.clone(),
        os: client.device.os.clone(),
        device_type: client.device.device_type.as_str().to_string(),
        created_at: now.naive_utc(),
        expires_at: (now + Duration::days(SESSION_TTL_DAYS)).timestamp_millis(),
    }
}

/// Stores a session row and returns its token.
pub fn create_session(
    conn: &mut SqliteConnection,
    new_session: &NewSession,
) -> Result<String, diesel::result::Error> {
    diesel::insert_into(sessions::table)
        .values(new_session)
        .execute(conn)?;
    Ok(new_session.token.clone())
}

/// Looks up a session by token, returning `None` for unknown or expired tokens.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    token: &str,
    now_millis: i64,
) -> Result<Option<Session>, diesel::result::Error> {
    sessions::table
        .filter(sessions::token.eq(token))
        .filter(sessions::expires_at.gt(now_millis))
        .select(Session::as_select())
        .first(conn)
        .optional()
}

/// Deletes the session with this token; returns the number of rows removed.
pub fn delete_session(conn: &mut SqliteConnection, token: &str) -> Result<usize, diesel::result::Error> {
    diesel::delete(sessions::table.filter(sessions::token.eq(token))).execute(conn)
}

/// Resolves a token into the typed session contract.
///
/// Returns `None` when the token is unknown, expired, carries an unrecognised
/// role, or points at a principal that no longer exists.
pub fn load_session_data(
    conn: &mut SqliteConnection,
    token: &str,
    now_millis: i64,
) -> Result<Option<SessionData>, diesel::result::Error> {
    let Some(session) = get_session_by_token(conn, token, now_millis)? else {
        return Ok(None);
    };
    let Ok(role) = session.role.parse::<Role>() else {
        return Ok(None);
    };
    let Some(principal) = find_principal(conn, role, session.user_id)? else {
        return Ok(None);
    };

    Ok(Some(SessionData {
        user_id: session.user_id,
        email: principal.email().to_string(),
        role,
        school_id: session.school_id,
    }))
}

/// Lists a principal's unexpired sessions, newest first.
pub fn list_active_sessions(
    conn: &mut SqliteConnection,
    role: Role,
    user_id: i32,
    now_millis: i64,
) -> Result<Vec<Session>, diesel::result::Error> {
    sessions::table
        .filter(sessions::role.eq(role.as_str()))
        .filter(sessions::user_id.eq(user_id))
        .filter(sessions::expires_at.gt(now_millis))
        .order(sessions::created_at.desc())
        .select(Session::as_select())
        .load(conn)
}

/// Deletes one session by row id, but only if it belongs to the given principal.
pub fn delete_principal_session(
    conn: &mut SqliteConnection,
    session_id: i32,
    role: Role,
    user_id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(
        sessions::table
            .filter(sessions::id.eq(session_id))
            .filter(sessions::role.eq(role.as_str()))
            .filter(sessions::user_id.eq(user_id)),
    )
    .execute(conn)
}

/// Lists every stored session, expired or not, for administrative tooling.
pub fn list_all_sessions(conn: &mut SqliteConnection) -> Result<Vec<Session>, diesel::result::Error> {
    sessions::table
        .order(sessions::id.asc())
        .select(Session::as_select())
        .load(conn)
}

/// Deletes a session by row id regardless of owner.
pub fn delete_session_by_id(
    conn: &mut SqliteConnection,
    session_id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(sessions::table.find(session_id)).execute(conn)
}

/// Removes rows whose expiry has passed. Only run on demand by operators.
pub fn purge_expired_sessions(
    conn: &mut SqliteConnection,
    now_millis: i64,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(sessions::table.filter(sessions::expires_at.le(now_millis))).execute(conn)
}
