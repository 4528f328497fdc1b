//! Session manager: the bridge between the opaque session cookie and
//! [`SessionData`].
//!
//! Staff (super admins and school admins) and teachers carry their token in
//! different cookies. Both are handled by the same [`SessionManager`], which
//! only differs in the cookie name it owns, so the route guard and the API
//! routes see one contract regardless of who is signed in.
//!
//! [`SessionManager::get_session`] is the single place a token is turned into
//! a session; expiry is enforced there (through the session store) and every
//! failure, including an unreachable database, resolves to `None`.

use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::time::Duration;

use crate::config::AppConfig;
use crate::models::{Role, SessionData};
use crate::orm::DbRunner;
use crate::orm::session::{SESSION_TTL_DAYS, load_session_data, now_millis};

pub const SESSION_COOKIE: &str = "session";
pub const TEACHER_SESSION_COOKIE: &str = "teacher_session";

/// Which session cookie a manager owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionKind {
    /// Super admins and school admins.
    Primary,
    Teacher,
}

impl SessionKind {
    pub fn cookie_name(&self) -> &'static str {
        match self {
            SessionKind::Primary => SESSION_COOKIE,
            SessionKind::Teacher => TEACHER_SESSION_COOKIE,
        }
    }

    /// The cookie a principal of `role` is issued.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::SuperAdmin | Role::SchoolAdmin => SessionKind::Primary,
            Role::Teacher => SessionKind::Teacher,
        }
    }

    /// Whether a session of this role may be carried by this cookie.
    pub fn accepts(&self, role: Role) -> bool {
        SessionKind::for_role(role) == *self
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SessionManager {
    kind: SessionKind,
    secure: bool,
}

impl SessionManager {
    pub fn new(kind: SessionKind, secure: bool) -> Self {
        SessionManager { kind, secure }
    }

    pub fn from_config(kind: SessionKind, config: &AppConfig) -> Self {
        SessionManager::new(kind, config.cookies_secure())
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Sets the session cookie: HTTP-only, `SameSite=Lax`, secure in
    /// production, seven day max-age, root path.
    pub fn set_session_cookie(&self, cookies: &CookieJar<'_>, token: &str) {
        let cookie = Cookie::build((self.kind.cookie_name(), token.to_string()))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::days(SESSION_TTL_DAYS))
            .path("/")
            .build();
        cookies.add(cookie);
    }

    /// Reads the token from the cookie jar, if present and non-empty.
    pub fn get_session_token(&self, cookies: &CookieJar<'_>) -> Option<String> {
        cookies
            .get(self.kind.cookie_name())
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    }

    /// Resolves the cookie into live session data.
    ///
    /// Returns `None` when there is no token, the token is unknown or expired,
    /// the session's role does not belong in this cookie, or the store cannot
    /// be reached.
    pub async fn get_session<D: DbRunner>(
        &self,
        cookies: &CookieJar<'_>,
        db: &D,
    ) -> Option<SessionData> {
        let token = self.get_session_token(cookies)?;
        self.resolve_token(db, token).await
    }

    /// Resolves an already extracted token. See [`SessionManager::get_session`].
    pub async fn resolve_token<D: DbRunner>(&self, db: &D, token: String) -> Option<SessionData> {
        let now = now_millis();
        match db.run(move |conn| load_session_data(conn, &token, now)).await {
            Ok(Some(data)) if self.kind.accepts(data.role) => Some(data),
            Ok(Some(data)) => {
                warn!(
                    "[session] {} session presented in the {} cookie",
                    data.role,
                    self.kind.cookie_name()
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                error!("[session] Session store lookup failed: {}", e);
                None
            }
        }
    }

    /// Removes the session cookie. Safe to call when no cookie is set.
    pub fn clear_session(&self, cookies: &CookieJar<'_>) {
        cookies.remove(Cookie::build(self.kind.cookie_name()).path("/"));
    }
}
