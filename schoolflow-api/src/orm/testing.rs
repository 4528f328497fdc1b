//! Test support: in-memory databases, a connection wrapper usable wherever a
//! [`DbRunner`] is expected, and a fully wired Rocket instance seeded with
//! known principals.

use std::sync::{Arc, Mutex};

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket, fairing::AdHoc};

use super::db::{DbConn, DbRunner, run_pending_migrations, set_foreign_keys};
use crate::access_log::{AccessLogEvent, AccessLogSink, AccessLogger};
use crate::admin_init_fairing::admin_init_fairing;
use crate::models::{AccountStatus, PrincipalInput, Role};
use crate::orm::login::hash_password;
use crate::orm::principal::{email_in_use, insert_principal};
use crate::orm::school::insert_school;

/// Accounts seeded into every [`test_rocket`] database.
pub mod fixtures {
    /// Shared password of every seeded principal.
    pub const PASSWORD: &str = "Fixture1Pass";

    pub const SCHOOL_NAME: &str = "Test Academy";
    pub const SUPER_ADMIN_EMAIL: &str = "root@schoolflow.test";
    pub const SCHOOL_ADMIN_EMAIL: &str = "admin@testacademy.test";
    pub const SUSPENDED_SCHOOL_ADMIN_EMAIL: &str = "suspended.admin@testacademy.test";
    pub const TEACHER_EMAIL: &str = "teacher@testacademy.test";
    pub const INACTIVE_TEACHER_EMAIL: &str = "inactive.teacher@testacademy.test";
    pub const DELETED_TEACHER_EMAIL: &str = "deleted.teacher@testacademy.test";
}

/// Configures SQLite with performance-optimized settings for testing.
///
/// These settings make SQLite faster but less durable; only use for testing.
fn set_sqlite_test_pragmas(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(
        r#"
        PRAGMA synchronous = OFF;
        PRAGMA journal_mode = OFF;
        "#,
    )
}

fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::on_ignite("Set SQLite Test Pragmas", |rocket| async {
        if let Some(conn) = DbConn::get_one(&rocket).await {
            if let Err(e) = conn.run(set_sqlite_test_pragmas).await {
                warn!("[test-data-init] Could not set test pragmas: {}", e);
            }
        }
        rocket
    })
}

/// Creates the standard school and principals that integration tests rely on.
pub fn create_test_data(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    if email_in_use(conn, fixtures::SUPER_ADMIN_EMAIL)? {
        return Ok(());
    }

    let password_hash = hash_password(fixtures::PASSWORD)
        .map_err(|e| diesel::result::Error::QueryBuilderError(e.to_string().into()))?;
    let school = insert_school(conn, fixtures::SCHOOL_NAME, "active")?;

    let seeds = [
        (Role::SuperAdmin, fixtures::SUPER_ADMIN_EMAIL, AccountStatus::Active),
        (Role::SchoolAdmin, fixtures::SCHOOL_ADMIN_EMAIL, AccountStatus::Active),
        (Role::SchoolAdmin, fixtures::SUSPENDED_SCHOOL_ADMIN_EMAIL, AccountStatus::Suspended),
        (Role::Teacher, fixtures::TEACHER_EMAIL, AccountStatus::Active),
        (Role::Teacher, fixtures::INACTIVE_TEACHER_EMAIL, AccountStatus::Inactive),
        (Role::Teacher, fixtures::DELETED_TEACHER_EMAIL, AccountStatus::Deleted),
    ];

    for (role, email, status) in seeds {
        insert_principal(
            conn,
            PrincipalInput {
                role,
                email: email.to_string(),
                name: format!("Fixture {}", role),
                password_hash: password_hash.clone(),
                status,
                school_id: match role {
                    Role::SuperAdmin => None,
                    Role::SchoolAdmin | Role::Teacher => Some(school.id),
                },
            },
        )?;
        debug!("[test-data-init] Created {} '{}'", role, email);
    }

    Ok(())
}

fn test_data_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Test Data Initialization", |rocket| async {
        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("[test-data-init] Could not get DB connection");
            return Err(rocket);
        };
        match conn.run(create_test_data).await {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[test-data-init] Failed to create test data: {:?}", e);
                Err(rocket)
            }
        }
    })
}

/// Builds an unignited Rocket with a fresh in-memory database, migrations,
/// the bootstrap super admin, the seeded fixtures and every route mounted.
pub fn test_rocket() -> Rocket<Build> {
    use uuid::Uuid;

    // Unique shared-cache name so each test gets its own database that all
    // pooled connections can see.
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };

    let figment = rocket::Config::figment()
        .merge(("databases", map!["sqlite_db" => db_config]))
        .merge(("schoolflow.secure_cookies", false));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(super::db::set_foreign_keys_fairing())
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(super::db::run_migrations_fairing())
        .attach(admin_init_fairing())
        .attach(test_data_init_fairing());

    crate::mount_app(rocket)
}

/// Like [`test_rocket`], but access-log events go to `sink`.
pub fn test_rocket_with_sink(sink: Arc<dyn AccessLogSink>) -> Rocket<Build> {
    test_rocket().manage(AccessLogger::new(sink))
}

/// Creates a synchronous in-memory SQLite database with all migrations run.
///
/// Each call returns a new, independent database.
pub fn setup_test_db() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn).expect("Failed to enable foreign keys");
    run_pending_migrations(&mut conn).expect("Failed to run migrations");
    conn
}

/// A plain connection behind the async `.run()` interface that [`DbConn`]
/// offers, for unit-testing code generic over [`DbRunner`].
pub struct FakeDbConn(Mutex<SqliteConnection>);

impl FakeDbConn {
    pub fn new(conn: SqliteConnection) -> Self {
        FakeDbConn(Mutex::new(conn))
    }

    pub async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut conn = self.0.lock().expect("test connection lock poisoned");
        f(&mut conn)
    }
}

impl DbRunner for FakeDbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        FakeDbConn::run(self, f)
    }
}

/// Access-log sink that keeps events in memory.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<AccessLogEvent>>,
}

impl MemorySink {
    pub fn events(&self) -> Vec<AccessLogEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[rocket::async_trait]
impl AccessLogSink for MemorySink {
    async fn record(&self, event: AccessLogEvent) -> Result<(), String> {
        self.events
            .lock()
            .map_err(|e| e.to_string())?
            .push(event);
        Ok(())
    }
}

/// Access-log sink that always fails.
pub struct FailingSink;

#[rocket::async_trait]
impl AccessLogSink for FailingSink {
    async fn record(&self, _event: AccessLogEvent) -> Result<(), String> {
        Err("collector unavailable".to_string())
    }
}
