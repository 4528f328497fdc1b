#[macro_use]
extern crate rocket;

use rocket::figment::value::Map;
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use rocket::fs::{FileServer, Options};
use rocket::request::Request;
use rocket::serde::json::{Json, Value, json};
use rocket::{Build, Rocket};

pub mod access_log;
pub mod admin_init_fairing;
pub mod api;
pub mod config;
pub mod device;
pub mod ip;
pub mod logged_json;
pub mod models;
pub mod orm;
pub use orm::DbConn;
pub mod route_guard;
pub mod schema;
pub mod session;
pub mod session_guards;
pub mod shell;

#[cfg(test)]
pub mod generate_types;

fn error_body(error: &str, status: u16, req: &Request) -> Json<Value> {
    Json(json!({
        "error": error,
        "path": req.uri().path().to_string(),
        "status": status
    }))
}

#[catch(400)]
fn bad_request(req: &Request) -> Json<Value> {
    error_body("Bad Request", 400, req)
}

#[catch(401)]
fn unauthorized(req: &Request) -> Json<Value> {
    error_body("Unauthorized", 401, req)
}

#[catch(403)]
fn forbidden(req: &Request) -> Json<Value> {
    error_body("Forbidden", 403, req)
}

#[catch(404)]
fn not_found(req: &Request) -> Json<Value> {
    error_body("Not Found", 404, req)
}

#[catch(422)]
fn unprocessable_entity(req: &Request) -> Json<Value> {
    error_body("Unprocessable Entity", 422, req)
}

#[catch(500)]
fn internal_server_error(req: &Request) -> Json<Value> {
    error_body("Internal Server Error", 500, req)
}

#[catch(default)]
fn default_catcher(status: rocket::http::Status, req: &Request) -> Json<Value> {
    error_body(status.reason().unwrap_or("Unknown Error"), status.code, req)
}

/// Attaches everything that doesn't depend on where the database lives:
/// configuration, access logging, the route guard, catchers and routes.
///
/// Shared by [`rocket`] and the in-memory test instance.
pub fn mount_app(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(config::config_fairing())
        .attach(access_log::access_log_fairing())
        .attach(route_guard::RouteGuard)
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                unprocessable_entity,
                internal_server_error,
                default_catcher
            ],
        )
        .mount("/", routes![route_guard::guard_redirect])
        .mount("/api", api::routes())
}

fn log_rocket_info(rocket: &Rocket<Build>) {
    let figment = rocket.figment();

    if let Ok(address) = figment.extract_inner::<String>("address") {
        info!("Rocket is running at: {}", address);
    }

    if let Ok(port) = figment.extract_inner::<u16>("port") {
        info!("Rocket is listening on port: {}", port);
    }

    match figment.extract_inner::<Map<String, Value>>("databases.sqlite_db") {
        Ok(db_config) => {
            if let Some(Value::String(url)) = db_config.get("url") {
                info!("Database URL: {}", url);
            } else {
                warn!("Database URL not found in configuration");
            }
        }
        Err(e) => {
            warn!("Failed to extract database configuration: {}", e);
        }
    }
}

/// Builds the production server.
///
/// Not exercised by the tests, which use `orm::testing::test_rocket` and an
/// in-memory database instead.
pub fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    let mut figment = Figment::from(rocket::Config::default())
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global());
    match std::env::var("DATABASE_URL") {
        Ok(database_url) => figment = figment.merge(("databases.sqlite_db.url", database_url)),
        Err(_) => warn!("DATABASE_URL is not set; relying on Rocket.toml for the database"),
    }

    let static_dir = config::AppConfig::from_figment(&figment)
        .map(|config| config.static_dir())
        .unwrap_or_else(|_| "static".to_string());

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(orm::set_foreign_keys_fairing())
        .attach(orm::run_migrations_fairing())
        .attach(admin_init_fairing::admin_init_fairing());

    log_rocket_info(&rocket);

    mount_app(rocket).mount(
        "/",
        FileServer::new(static_dir, Options::Index | Options::Missing).rank(10),
    )
}
