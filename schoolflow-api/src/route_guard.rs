//! Role-based route guard.
//!
//! [`RouteGuard`] is a request/response fairing evaluated once per request,
//! before routing. It assigns a request id, emits the access-log event and,
//! for page routes, decides between letting the request through and
//! redirecting it to a login page.
//!
//! | Path                       | Session                     | Outcome                       |
//! |----------------------------|-----------------------------|-------------------------------|
//! | public or `/api/...`       | any                         | allow                         |
//! | other                      | none, unknown or expired    | `/login?redirect=<path>`      |
//! | `/super-admin/...`         | role other than super admin | `/login`                      |
//! | `/school-admin/...`        | role other than school admin| `/login`                      |
//! | other                      | valid                       | allow                         |
//!
//! Fairings cannot answer a request themselves, so a redirect decision is
//! stored in the request-local cache and the request is rerouted to
//! [`guard_redirect`], which turns it into a `303 See Other`.
//!
//! The guard never looks at account status; dashboard shells do that (see
//! [`crate::shell`]).

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Cookie, Method, SameSite, Status};
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest};
use rocket::response::Redirect;
use rocket::time::Duration;
use rocket::{Data, Request, Response};
use uuid::Uuid;

use crate::access_log::{AccessLogEvent, AccessLogger};
use crate::models::{Role, SessionData};
use crate::orm::DbConn;
use crate::session::{SessionKind, SessionManager};

pub const SUPER_ADMIN_PREFIX: &str = "/super-admin";
pub const SCHOOL_ADMIN_PREFIX: &str = "/school-admin";
pub const API_PREFIX: &str = "/api";
pub const LOGIN_PATH: &str = "/login";

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const REQUEST_ID_COOKIE: &str = "request-id";
const REQUEST_ID_COOKIE_SECONDS: i64 = 60;

/// Pages reachable without a session.
const PUBLIC_PATHS: [&str; 13] = [
    "/",
    "/login",
    "/register",
    "/teacher/login",
    "/access-blocked",
    "/about",
    "/features",
    "/pricing",
    "/contact",
    "/privacy",
    "/terms",
    "/favicon.ico",
    "/robots.txt",
];

/// Static asset trees.
const PUBLIC_PREFIXES: [&str; 2] = ["/static", "/assets"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Public,
    Api,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// True when `path` is `prefix` or lies below it.
fn under_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// The path as routing sees it: percent-decoded segments with empty
/// segments dropped, so `//super%2Dadmin/` becomes `/super-admin`.
pub fn canonical_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        })
        .collect();
    format!("/{}", segments.join("/"))
}

pub fn classify(path: &str) -> PathClass {
    let path = canonical_path(path);
    let path = path.as_str();
    if under_prefix(path, API_PREFIX) {
        PathClass::Api
    } else if PUBLIC_PATHS.contains(&path)
        || PUBLIC_PREFIXES.iter().any(|prefix| under_prefix(path, prefix))
    {
        PathClass::Public
    } else {
        PathClass::Protected
    }
}

/// The role a path prefix is reserved for, if any.
pub fn required_role(path: &str) -> Option<Role> {
    let path = canonical_path(path);
    if under_prefix(&path, SUPER_ADMIN_PREFIX) {
        Some(Role::SuperAdmin)
    } else if under_prefix(&path, SCHOOL_ADMIN_PREFIX) {
        Some(Role::SchoolAdmin)
    } else {
        None
    }
}

pub fn login_redirect(path: &str) -> String {
    format!("{}?redirect={}", LOGIN_PATH, urlencoding::encode(path))
}

/// Decides what happens to a request for `path` given its resolved session.
pub fn decide(path: &str, session: Option<&SessionData>) -> GuardDecision {
    let path = canonical_path(path);
    if classify(&path) != PathClass::Protected {
        return GuardDecision::Allow;
    }
    let Some(session) = session else {
        return GuardDecision::Redirect(login_redirect(&path));
    };
    match required_role(&path) {
        Some(role) if session.role != role => GuardDecision::Redirect(LOGIN_PATH.to_string()),
        _ => GuardDecision::Allow,
    }
}

/// Per-request state the guard keeps between its request and response hooks.
struct GuardContext {
    request_id: String,
    api: bool,
    https: bool,
}

struct PendingRedirect(Option<String>);

/// The id assigned to the current request.
pub struct RequestId(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequestId {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.local_cache(|| None::<GuardContext>) {
            Some(ctx) => Outcome::Success(RequestId(ctx.request_id.clone())),
            None => Outcome::Success(RequestId(String::new())),
        }
    }
}

/// Resolves whichever session cookie the request carries, primary first.
///
/// An unavailable pool counts as no session.
async fn resolve_session(req: &Request<'_>) -> Option<SessionData> {
    let Some(db) = DbConn::get_one(req.rocket()).await else {
        error!("[route-guard] No database connection; treating request as unauthenticated");
        return None;
    };
    for kind in [SessionKind::Primary, SessionKind::Teacher] {
        let manager = SessionManager::new(kind, false);
        if let Some(session) = manager.get_session(req.cookies(), &db).await {
            return Some(session);
        }
    }
    None
}

pub struct RouteGuard;

#[rocket::async_trait]
impl Fairing for RouteGuard {
    fn info(&self) -> Info {
        Info {
            name: "Role-Based Route Guard",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let path = canonical_path(req.uri().path().as_str());
        let class = classify(&path);
        let https = req
            .headers()
            .get_one("x-forwarded-proto")
            .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));
        let ctx = req.local_cache(|| {
            Some(GuardContext {
                request_id: Uuid::new_v4().to_string(),
                api: class == PathClass::Api,
                https,
            })
        });
        let request_id = ctx
            .as_ref()
            .map(|ctx| ctx.request_id.clone())
            .unwrap_or_default();

        if let Some(logger) = req.rocket().state::<AccessLogger>() {
            logger.emit(AccessLogEvent::from_request(req, &request_id));
        }

        if class != PathClass::Protected {
            return;
        }

        let session = resolve_session(req).await;
        if let GuardDecision::Redirect(location) = decide(&path, session.as_ref()) {
            debug!("[route-guard] {} {} -> {}", request_id, path, location);
            req.local_cache(|| PendingRedirect(Some(location)));
            req.set_method(Method::Get);
            req.set_uri(uri!("/_guard/redirect"));
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(ctx) = req.local_cache(|| None::<GuardContext>) else {
            return;
        };
        res.set_raw_header(REQUEST_ID_HEADER, ctx.request_id.clone());
        if !ctx.api {
            let cookie = Cookie::build((REQUEST_ID_COOKIE, ctx.request_id.clone()))
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(ctx.https)
                .max_age(Duration::seconds(REQUEST_ID_COOKIE_SECONDS))
                .path("/")
                .build();
            res.adjoin_raw_header("Set-Cookie", cookie.to_string());
        }
    }
}

/// A redirect decided by the guard for this request.
pub struct GuardRedirect(String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GuardRedirect {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match &req.local_cache(|| PendingRedirect(None)).0 {
            Some(location) => Outcome::Success(GuardRedirect(location.clone())),
            None => Outcome::Forward(Status::NotFound),
        }
    }
}

#[get("/_guard/redirect")]
pub fn guard_redirect(target: GuardRedirect) -> Redirect {
    Redirect::to(target.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> SessionData {
        SessionData {
            user_id: 1,
            email: "x@sf.test".to_string(),
            role,
            school_id: None,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("/"), PathClass::Public);
        assert_eq!(classify("/login"), PathClass::Public);
        assert_eq!(classify("/login/"), PathClass::Public);
        assert_eq!(classify("/teacher/login"), PathClass::Public);
        assert_eq!(classify("/static/app.js"), PathClass::Public);
        assert_eq!(classify("/assets/img/logo.png"), PathClass::Public);
        assert_eq!(classify("/api/1/session"), PathClass::Api);
        assert_eq!(classify("/api"), PathClass::Api);

        assert_eq!(classify("/apiary"), PathClass::Protected);
        assert_eq!(classify("/staticfiles"), PathClass::Protected);
        assert_eq!(classify("/loginx"), PathClass::Protected);
        assert_eq!(classify("/teacher/dashboard"), PathClass::Protected);
        assert_eq!(classify("/school-admin/students"), PathClass::Protected);
    }

    #[test]
    fn test_canonical_path() {
        assert_eq!(canonical_path("/"), "/");
        assert_eq!(canonical_path(""), "/");
        assert_eq!(canonical_path("/login/"), "/login");
        assert_eq!(canonical_path("//super-admin//schools/"), "/super-admin/schools");
        assert_eq!(canonical_path("/super%2Dadmin/"), "/super-admin");
        assert_eq!(canonical_path("/school%2dadmin/fees"), "/school-admin/fees");
    }

    #[test]
    fn test_encoded_and_doubled_prefixes_keep_role_gate() {
        let admin = session(Role::SchoolAdmin);
        for path in ["/super%2Dadmin/", "//super-admin/", "/%73uper-admin/schools"] {
            assert_eq!(
                decide(path, Some(&admin)),
                GuardDecision::Redirect("/login".to_string()),
                "{}",
                path
            );
        }
        assert_eq!(
            decide("//school-admin//students", None),
            GuardDecision::Redirect("/login?redirect=%2Fschool-admin%2Fstudents".to_string())
        );
    }

    #[test]
    fn test_required_role_is_segment_aware() {
        assert_eq!(required_role("/super-admin"), Some(Role::SuperAdmin));
        assert_eq!(required_role("/super-admin/schools"), Some(Role::SuperAdmin));
        assert_eq!(required_role("/school-admin/fees"), Some(Role::SchoolAdmin));
        assert_eq!(required_role("/super-administrator"), None);
        assert_eq!(required_role("/dashboard"), None);
    }

    #[test]
    fn test_public_paths_allowed_without_session() {
        for path in PUBLIC_PATHS {
            assert_eq!(decide(path, None), GuardDecision::Allow, "{}", path);
        }
        assert_eq!(decide("/api/1/sessions", None), GuardDecision::Allow);
    }

    #[test]
    fn test_missing_session_redirects_with_path() {
        assert_eq!(
            decide("/school-admin/students", None),
            GuardDecision::Redirect("/login?redirect=%2Fschool-admin%2Fstudents".to_string())
        );
    }

    #[test]
    fn test_wrong_role_redirects_to_login() {
        let admin = session(Role::SchoolAdmin);
        assert_eq!(
            decide("/super-admin/schools", Some(&admin)),
            GuardDecision::Redirect("/login".to_string())
        );

        let teacher = session(Role::Teacher);
        assert_eq!(
            decide("/school-admin", Some(&teacher)),
            GuardDecision::Redirect("/login".to_string())
        );
    }

    #[test]
    fn test_matching_or_unrestricted_role_allowed() {
        let root = session(Role::SuperAdmin);
        assert_eq!(decide("/super-admin/schools", Some(&root)), GuardDecision::Allow);

        let teacher = session(Role::Teacher);
        assert_eq!(decide("/teacher/dashboard", Some(&teacher)), GuardDecision::Allow);
        assert_eq!(decide("/profile", Some(&root)), GuardDecision::Allow);
    }
}
