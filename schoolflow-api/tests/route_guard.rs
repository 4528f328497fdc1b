#[macro_use]
extern crate time_test;

use rocket::http::{Cookie, Header, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::json;

use schoolflow_api::DbConn;
use schoolflow_api::models::{NewSession, Role};
use schoolflow_api::orm::session::{create_session, generate_session_token, now_millis};
use schoolflow_api::orm::testing::{fixtures, test_rocket};

async fn login(client: &Client, path: &str, email: &str) -> String {
    let response = client
        .post(path)
        .json(&json!({ "email": email, "password": fixtures::PASSWORD }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok, "login as {} failed", email);
    let cookie_name = if path.contains("teacher") {
        "teacher_session"
    } else {
        "session"
    };
    response
        .cookies()
        .get(cookie_name)
        .expect("session cookie")
        .value()
        .to_string()
}

fn location(response: &rocket::local::asynchronous::LocalResponse<'_>) -> Option<String> {
    response.headers().get_one("Location").map(str::to_string)
}

#[tokio::test]
async fn test_public_paths_need_no_session() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    time_test!("test_public_paths_need_no_session");

    for path in ["/", "/login", "/register", "/teacher/login", "/access-blocked", "/static/app.js"] {
        let response = client.get(path).dispatch().await;
        assert_ne!(response.status(), Status::SeeOther, "{} was redirected", path);
    }
}

#[tokio::test]
async fn test_api_routes_are_not_redirected() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let response = client.get("/api/1/sessions").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    assert!(location(&response).is_none());
}

#[tokio::test]
async fn test_protected_path_without_cookie_redirects_to_login() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let response = client.get("/school-admin/students").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        location(&response).as_deref(),
        Some("/login?redirect=%2Fschool-admin%2Fstudents")
    );
}

#[tokio::test]
async fn test_post_to_protected_path_is_redirected_too() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let response = client.post("/super-admin/schools").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        location(&response).as_deref(),
        Some("/login?redirect=%2Fsuper-admin%2Fschools")
    );
}

#[tokio::test]
async fn test_unknown_token_behaves_as_no_session() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let response = client
        .get("/dashboard")
        .cookie(Cookie::new("session", "not-a-real-token"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(location(&response).as_deref(), Some("/login?redirect=%2Fdashboard"));
}

#[tokio::test]
async fn test_expired_session_behaves_as_no_session() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    time_test!("test_expired_session_behaves_as_no_session");

    let conn = DbConn::get_one(client.rocket()).await.expect("db connection");
    let token = conn
        .run(|c| {
            let now = chrono::Utc::now().naive_utc();
            create_session(
                c,
                &NewSession {
                    token: generate_session_token(),
                    user_id: 1,
                    role: Role::SuperAdmin.as_str().to_string(),
                    school_id: None,
                    ip_address: "127.0.0.1".to_string(),
                    device: "Desktop".to_string(),
                    browser: "Firefox 121".to_string(),
                    os: "Ubuntu".to_string(),
                    device_type: "desktop".to_string(),
                    created_at: now,
                    expires_at: now_millis() - 1_000,
                },
            )
        })
        .await
        .expect("insert expired session");

    let response = client
        .get("/super-admin")
        .cookie(Cookie::new("session", token.clone()))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(location(&response).as_deref(), Some("/login?redirect=%2Fsuper-admin"));

    let check = client
        .get("/api/1/session")
        .cookie(Cookie::new("session", token))
        .dispatch()
        .await;
    assert_eq!(check.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_school_admin_cannot_enter_super_admin_area() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    time_test!("test_school_admin_cannot_enter_super_admin_area");

    let token = login(&client, "/api/1/login", fixtures::SCHOOL_ADMIN_EMAIL).await;

    let response = client
        .get("/super-admin/schools")
        .cookie(Cookie::new("session", token.clone()))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(location(&response).as_deref(), Some("/login"));

    let allowed = client
        .get("/school-admin/students")
        .cookie(Cookie::new("session", token))
        .dispatch()
        .await;
    assert_ne!(allowed.status(), Status::SeeOther);
}

#[tokio::test]
async fn test_encoded_or_doubled_paths_keep_role_gate() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let token = login(&client, "/api/1/login", fixtures::SCHOOL_ADMIN_EMAIL).await;

    for path in ["/super%2Dadmin/", "//super-admin/", "/super%2dadmin/schools"] {
        let response = client
            .get(path)
            .cookie(Cookie::new("session", token.clone()))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::SeeOther, "{} was not gated", path);
        assert_eq!(location(&response).as_deref(), Some("/login"), "{}", path);
    }

    let response = client.get("//school-admin//students").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        location(&response).as_deref(),
        Some("/login?redirect=%2Fschool-admin%2Fstudents")
    );
}

#[tokio::test]
async fn test_super_admin_cannot_enter_school_admin_area() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let token = login(&client, "/api/1/login", fixtures::SUPER_ADMIN_EMAIL).await;

    let response = client
        .get("/school-admin")
        .cookie(Cookie::new("session", token.clone()))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(location(&response).as_deref(), Some("/login"));

    let allowed = client
        .get("/super-admin/schools")
        .cookie(Cookie::new("session", token))
        .dispatch()
        .await;
    assert_ne!(allowed.status(), Status::SeeOther);
}

#[tokio::test]
async fn test_teacher_session_opens_unrestricted_pages_only() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let token = login(&client, "/api/1/teacher/login", fixtures::TEACHER_EMAIL).await;

    let dashboard = client
        .get("/teacher/dashboard")
        .cookie(Cookie::new("teacher_session", token.clone()))
        .dispatch()
        .await;
    assert_ne!(dashboard.status(), Status::SeeOther);

    let admin_area = client
        .get("/school-admin")
        .cookie(Cookie::new("teacher_session", token))
        .dispatch()
        .await;
    assert_eq!(admin_area.status(), Status::SeeOther);
    assert_eq!(location(&admin_area).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_teacher_token_in_staff_cookie_is_rejected() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let token = login(&client, "/api/1/teacher/login", fixtures::TEACHER_EMAIL).await;

    let response = client
        .get("/teacher/dashboard")
        .cookie(Cookie::new("session", token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
}

#[tokio::test]
async fn test_guard_does_not_check_status() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let token = login(&client, "/api/1/login", fixtures::SUSPENDED_SCHOOL_ADMIN_EMAIL).await;

    let response = client
        .get("/school-admin/students")
        .cookie(Cookie::new("session", token))
        .dispatch()
        .await;
    assert_ne!(response.status(), Status::SeeOther);
}

#[tokio::test]
async fn test_request_id_header_and_cookie() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let page = client.get("/login").dispatch().await;
    let request_id = page
        .headers()
        .get_one("x-request-id")
        .expect("x-request-id header")
        .to_string();
    assert_eq!(request_id.len(), 36);
    let cookie = page.cookies().get("request-id").expect("request-id cookie");
    assert_eq!(cookie.value(), request_id);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.max_age(), Some(rocket::time::Duration::seconds(60)));
    assert_ne!(cookie.secure(), Some(true));

    let api = client.get("/api/1/status").dispatch().await;
    let api_request_id = api
        .headers()
        .get_one("x-request-id")
        .expect("x-request-id header")
        .to_string();
    assert_ne!(api_request_id, request_id);
    assert!(api.cookies().get("request-id").is_none());

    let body: serde_json::Value = api.into_json().await.unwrap();
    assert_eq!(body["request_id"], api_request_id);
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn test_request_id_cookie_is_secure_behind_https() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let response = client
        .get("/")
        .header(Header::new("X-Forwarded-Proto", "https"))
        .dispatch()
        .await;
    let cookie = response.cookies().get("request-id").expect("request-id cookie");
    assert_eq!(cookie.secure(), Some(true));
}

#[tokio::test]
async fn test_redirect_also_carries_request_id() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let response = client.get("/school-admin").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert!(response.headers().get_one("x-request-id").is_some());
}
