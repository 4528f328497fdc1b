use std::sync::Arc;
use std::time::Duration;

use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;

use schoolflow_api::access_log::AccessLogEvent;
use schoolflow_api::orm::testing::{FailingSink, MemorySink, test_rocket_with_sink};

async fn wait_for_events(sink: &MemorySink, count: usize) -> Vec<AccessLogEvent> {
    for _ in 0..50 {
        let events = sink.events();
        if events.len() >= count {
            return events;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    sink.events()
}

#[tokio::test]
async fn test_every_request_is_logged() {
    let sink = Arc::new(MemorySink::default());
    let client = Client::untracked(test_rocket_with_sink(sink.clone()))
        .await
        .unwrap();

    let page = client.get("/login").dispatch().await;
    let page_id = page.headers().get_one("x-request-id").unwrap().to_string();
    client.get("/api/1/status").dispatch().await;
    client.get("/school-admin/students").dispatch().await;

    let events = wait_for_events(&sink, 3).await;
    assert_eq!(events.len(), 3);

    let paths: Vec<&str> = events.iter().map(|e| e.path.as_str()).collect();
    assert!(paths.contains(&"/login"));
    assert!(paths.contains(&"/api/1/status"));
    assert!(paths.contains(&"/school-admin/students"));

    let login_event = events.iter().find(|e| e.path == "/login").unwrap();
    assert_eq!(login_event.request_id, page_id);
    assert_eq!(login_event.method, "GET");
}

#[tokio::test]
async fn test_cookie_values_are_not_logged() {
    let sink = Arc::new(MemorySink::default());
    let client = Client::untracked(test_rocket_with_sink(sink.clone()))
        .await
        .unwrap();

    client
        .get("/dashboard")
        .header(Header::new("Cookie", "session=super-secret-token"))
        .dispatch()
        .await;

    let events = wait_for_events(&sink, 1).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].cookies, vec!["session".to_string()]);
    assert_eq!(events[0].headers.get("cookie").map(String::as_str), Some("[redacted]"));
    let serialized = serde_json::to_string(&events[0]).unwrap();
    assert!(!serialized.contains("super-secret-token"));
}

#[tokio::test]
async fn test_sink_failure_does_not_affect_response() {
    let client = Client::untracked(test_rocket_with_sink(Arc::new(FailingSink)))
        .await
        .unwrap();

    let response = client.get("/api/1/status").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let redirect = client.get("/school-admin").dispatch().await;
    assert_eq!(redirect.status(), Status::SeeOther);
}
