//! Request guards that authorize API routes from the session cookies.
//!
//! API routes are exempt from the route guard and authorize themselves by
//! taking one of these guards as an argument:
//!
//! ```rust,ignore
//! #[get("/1/sessions")]
//! async fn list_sessions(auth: StaffSession, db: DbConn) -> Json<Vec<ActiveSession>> {
//!     // auth.session.role is SuperAdmin or SchoolAdmin here
//! }
//! ```
//!
//! [`StaffSession`] reads the primary `session` cookie (super admins and
//! school admins); [`TeacherSession`] reads `teacher_session`. Both fail with
//! `401 Unauthorized` when the cookie is missing, unknown, expired or carries
//! a session of the wrong role, and when the database cannot be reached.
//! Wrap the guard in `Option` to observe the unauthenticated case instead.

use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::models::SessionData;
use crate::orm::DbConn;
use crate::session::{SessionKind, SessionManager};

async fn authenticate(
    req: &Request<'_>,
    kind: SessionKind,
) -> request::Outcome<(SessionData, String), ()> {
    let manager = SessionManager::new(kind, false);
    let Some(token) = manager.get_session_token(req.cookies()) else {
        return Outcome::Error((Status::Unauthorized, ()));
    };
    let db = match req.guard::<DbConn>().await {
        Outcome::Success(db) => db,
        _ => {
            error!("[session-guard] No database connection available");
            return Outcome::Error((Status::Unauthorized, ()));
        }
    };
    match manager.resolve_token(&db, token.clone()).await {
        Some(session) => Outcome::Success((session, token)),
        None => Outcome::Error((Status::Unauthorized, ())),
    }
}

/// Macro to generate a session guard bound to one cookie.
macro_rules! create_session_guard {
    ($(#[$meta:meta])* $guard_name:ident, $kind:expr) => {
        $(#[$meta])*
        pub struct $guard_name {
            pub session: SessionData,
            /// The raw token, used to mark the current session in listings.
            pub token: String,
        }

        impl $guard_name {
            pub const KIND: SessionKind = $kind;
        }

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $guard_name {
            type Error = ();

            async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
                match authenticate(req, $kind).await {
                    Outcome::Success((session, token)) => {
                        Outcome::Success($guard_name { session, token })
                    }
                    Outcome::Error(e) => Outcome::Error(e),
                    Outcome::Forward(f) => Outcome::Forward(f),
                }
            }
        }
    };
}

create_session_guard!(
    /// A super admin or school admin authenticated through the `session` cookie.
    StaffSession,
    SessionKind::Primary
);

create_session_guard!(
    /// A teacher authenticated through the `teacher_session` cookie.
    TeacherSession,
    SessionKind::Teacher
);
