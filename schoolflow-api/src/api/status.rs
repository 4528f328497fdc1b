//! Health check endpoint.

use rocket::{Route, serde::json::Json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::route_guard::RequestId;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub built: String,
    pub git_commit: Option<String>,
    pub request_id: String,
}

/// Health Status endpoint.
///
/// - **URL:** `/api/1/status`
/// - **Method:** `GET`
/// - **Purpose:** Returns the health status of the application
/// - **Authentication:** None required
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "status": "running",
///   "version": "0.1.0",
///   "built": "Fri, 15 Aug 2025 18:13:43 +0000",
///   "git_commit": "cd51275141a2e7d49737aa7dd4e8ff7c9a804d67",
///   "request_id": "0b7e4f0e-3f55-4c55-9d43-8f6a2f1f4a3e"
/// }
/// ```
#[get("/1/status")]
pub fn health_status(request_id: RequestId) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        built: built_info::BUILT_TIME_UTC.to_string(),
        git_commit: built_info::GIT_COMMIT_HASH.map(str::to_string),
        request_id: request_id.0,
    })
}

pub fn routes() -> Vec<Route> {
    routes![health_status]
}
