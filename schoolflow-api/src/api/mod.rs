pub mod account;
pub mod login;
pub mod logout;
pub mod password;
pub mod register;
pub mod session;
pub mod sessions;
pub mod shell;
pub mod status;

use rocket::Route;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error body returned by every API route. Messages are generic; internal
/// details only go to the log.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = Custom<Json<ErrorResponse>>;

pub fn api_error(status: Status, message: &str) -> ApiError {
    Custom(
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

pub fn internal_error() -> ApiError {
    api_error(Status::InternalServerError, "Internal server error")
}

/// Body returned by routes that only report success.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(SuccessResponse { success: true })
    }
}

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(account::routes());
    routes.extend(login::routes());
    routes.extend(logout::routes());
    routes.extend(password::routes());
    routes.extend(register::routes());
    routes.extend(session::routes());
    routes.extend(sessions::routes());
    routes.extend(shell::routes());
    routes.extend(status::routes());
    routes
}
