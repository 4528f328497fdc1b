//! Structured per-request access log.
//!
//! The route guard builds one [`AccessLogEvent`] per request and hands it to
//! the managed [`AccessLogger`], which delivers it on a spawned task. The
//! request never waits for delivery and delivery errors are only logged.
//!
//! Cookie values and credential headers are never recorded; events carry
//! cookie names and a redacted header map.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rocket::Request;
use rocket::fairing::AdHoc;
use serde::Serialize;

use crate::config::AppConfig;

const REDACTED_HEADERS: [&str; 3] = ["cookie", "authorization", "set-cookie"];

#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEvent {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub cookies: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl AccessLogEvent {
    pub fn from_request(req: &Request<'_>, request_id: &str) -> Self {
        let headers = req
            .headers()
            .iter()
            .map(|header| {
                let name = header.name().as_str().to_ascii_lowercase();
                let value = if REDACTED_HEADERS.contains(&name.as_str()) {
                    "[redacted]".to_string()
                } else {
                    header.value().to_string()
                };
                (name, value)
            })
            .collect();

        AccessLogEvent {
            request_id: request_id.to_string(),
            method: req.method().as_str().to_string(),
            path: req.uri().path().to_string(),
            headers,
            cookies: cookie_names(req),
            timestamp: Utc::now(),
        }
    }
}

/// Names from the jar and from raw `Cookie` headers, sorted and deduplicated.
fn cookie_names(req: &Request<'_>) -> Vec<String> {
    let from_headers = req
        .headers()
        .get("cookie")
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.split('=').next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let mut names: Vec<String> = req
        .cookies()
        .iter()
        .map(|c| c.name().to_string())
        .chain(from_headers)
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Destination for access-log events.
#[rocket::async_trait]
pub trait AccessLogSink: Send + Sync {
    async fn record(&self, event: AccessLogEvent) -> Result<(), String>;
}

/// Writes events to the application log.
pub struct LogSink;

#[rocket::async_trait]
impl AccessLogSink for LogSink {
    async fn record(&self, event: AccessLogEvent) -> Result<(), String> {
        info!(
            "[access-log] {} {} {} cookies={:?}",
            event.request_id, event.method, event.path, event.cookies
        );
        Ok(())
    }
}

/// POSTs each event as JSON to a collector.
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
}

impl HttpSink {
    pub fn new(url: impl Into<String>) -> Self {
        HttpSink {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[rocket::async_trait]
impl AccessLogSink for HttpSink {
    async fn record(&self, event: AccessLogEvent) -> Result<(), String> {
        self.client
            .post(&self.url)
            .json(&event)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Managed handle the route guard emits through.
#[derive(Clone)]
pub struct AccessLogger {
    sink: Arc<dyn AccessLogSink>,
}

impl AccessLogger {
    pub fn new(sink: Arc<dyn AccessLogSink>) -> Self {
        AccessLogger { sink }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match &config.access_log_url {
            Some(url) => AccessLogger::new(Arc::new(HttpSink::new(url.clone()))),
            None => AccessLogger::new(Arc::new(LogSink)),
        }
    }

    /// Delivers `event` in the background.
    pub fn emit(&self, event: AccessLogEvent) {
        let sink = Arc::clone(&self.sink);
        rocket::tokio::spawn(async move {
            let request_id = event.request_id.clone();
            if let Err(e) = sink.record(event).await {
                warn!("[access-log] Dropped event {}: {}", request_id, e);
            }
        });
    }
}

/// Manages an [`AccessLogger`] built from [`AppConfig`], unless one is
/// already managed.
pub fn access_log_fairing() -> AdHoc {
    AdHoc::on_ignite("Access Log", |rocket| async {
        if rocket.state::<AccessLogger>().is_some() {
            return rocket;
        }
        let logger = match rocket.state::<AppConfig>() {
            Some(config) => AccessLogger::from_config(config),
            None => AccessLogger::new(Arc::new(LogSink)),
        };
        rocket.manage(logger)
    })
}
