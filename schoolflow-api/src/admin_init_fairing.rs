use diesel::prelude::*;
use dotenvy::dotenv;
use rocket::fairing::AdHoc;

use crate::models::{AccountStatus, PrincipalInput, Role};
use crate::orm::DbConn;
use crate::orm::login::hash_password;
use crate::orm::principal::{find_principal_by_email, insert_principal};

/// Add the default super admin if needed.
///
/// Set the default super admin email/pass based on envars
/// SCHOOLFLOW_DEFAULT_EMAIL and SCHOOLFLOW_DEFAULT_PASSWORD
pub fn admin_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Super Admin Initialization", |rocket| async {
        dotenv().ok();

        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("[admin-init] ERROR: Could not get DB connection.");
            return Err(rocket);
        };

        let admin_email = get_admin_email();
        match conn
            .run(move |c| create_super_admin_if_needed(c, &admin_email))
            .await
        {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[admin-init] FATAL: Super admin creation failed: {:?}", e);
                Err(rocket)
            }
        }
    })
}

fn get_admin_email() -> String {
    std::env::var("SCHOOLFLOW_DEFAULT_EMAIL")
        .unwrap_or_else(|_| "superadmin@example.com".to_string())
}

fn get_admin_password() -> String {
    std::env::var("SCHOOLFLOW_DEFAULT_PASSWORD").unwrap_or_else(|_| "admin".to_string())
}

fn create_super_admin_if_needed(
    c: &mut SqliteConnection,
    admin_email: &str,
) -> Result<(), diesel::result::Error> {
    if find_principal_by_email(c, Role::SuperAdmin, admin_email)?.is_some() {
        info!("[admin-init] Super admin '{}' already exists", admin_email);
        return Ok(());
    }

    let password_hash = hash_password(&get_admin_password())
        .map_err(|e| diesel::result::Error::QueryBuilderError(e.to_string().into()))?;

    insert_principal(
        c,
        PrincipalInput {
            role: Role::SuperAdmin,
            email: admin_email.to_string(),
            name: "Super Admin".to_string(),
            password_hash,
            status: AccountStatus::Active,
            school_id: None,
        },
    )?;
    info!("[admin-init] Created super admin: '{}'", admin_email);
    Ok(())
}
