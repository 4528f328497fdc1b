#[macro_use]
extern crate time_test;

use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::json;

use schoolflow_api::orm::testing::{fixtures, test_rocket};

#[tokio::test]
async fn test_session_check_without_cookie() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client.get("/api/1/session").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["authenticated"], false);
    assert!(body["session"].is_null());
}

#[tokio::test]
async fn test_session_check_matches_login() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_session_check_matches_login");

    let login = client
        .post("/api/1/login")
        .json(&json!({
            "email": fixtures::SCHOOL_ADMIN_EMAIL,
            "password": fixtures::PASSWORD
        }))
        .dispatch()
        .await;
    assert_eq!(login.status(), Status::Ok);
    let login_body: serde_json::Value = login.into_json().await.unwrap();

    let response = client.get("/api/1/session").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["session"]["user_id"], login_body["user_id"]);
    assert_eq!(body["session"]["school_id"], login_body["school_id"]);
    assert_eq!(body["session"]["role"], "school_admin");
    assert_eq!(body["session"]["email"], fixtures::SCHOOL_ADMIN_EMAIL);

    // The staff session is invisible to the teacher endpoint.
    let teacher = client.get("/api/1/teacher/session").dispatch().await;
    assert_eq!(teacher.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_teacher_session_check() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    client
        .post("/api/1/teacher/login")
        .json(&json!({
            "email": fixtures::TEACHER_EMAIL,
            "password": fixtures::PASSWORD
        }))
        .dispatch()
        .await;

    let response = client.get("/api/1/teacher/session").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["session"]["role"], "teacher");
    assert!(body["session"]["school_id"].is_number());

    let staff = client.get("/api/1/session").dispatch().await;
    assert_eq!(staff.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_logout_clears_session");

    let login = client
        .post("/api/1/login")
        .json(&json!({
            "email": fixtures::SUPER_ADMIN_EMAIL,
            "password": fixtures::PASSWORD
        }))
        .dispatch()
        .await;
    let token = login.cookies().get("session").unwrap().value().to_string();

    let response = client.post("/api/1/logout").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let removal = response.cookies().get("session").map(|c| c.value().to_string());
    assert_eq!(removal.as_deref().unwrap_or(""), "");
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["success"], true);

    let check = client.get("/api/1/session").dispatch().await;
    assert_eq!(check.status(), Status::Unauthorized);

    // The row is gone, so replaying the old token fails as well.
    let replay = client
        .get("/api/1/session")
        .cookie(Cookie::new("session", token))
        .dispatch()
        .await;
    assert_eq!(replay.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_logout_without_session_is_harmless() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client.post("/api/1/logout").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["success"], true);

    let again = client.post("/api/1/teacher/logout").dispatch().await;
    assert_eq!(again.status(), Status::Ok);
}

#[tokio::test]
async fn test_teacher_logout_leaves_staff_session() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    client
        .post("/api/1/login")
        .json(&json!({
            "email": fixtures::SCHOOL_ADMIN_EMAIL,
            "password": fixtures::PASSWORD
        }))
        .dispatch()
        .await;
    client
        .post("/api/1/teacher/login")
        .json(&json!({
            "email": fixtures::TEACHER_EMAIL,
            "password": fixtures::PASSWORD
        }))
        .dispatch()
        .await;

    let response = client.post("/api/1/teacher/logout").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    assert_eq!(
        client.get("/api/1/teacher/session").dispatch().await.status(),
        Status::Unauthorized
    );
    assert_eq!(client.get("/api/1/session").dispatch().await.status(), Status::Ok);
}
