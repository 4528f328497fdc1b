use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use schoolflow_api::models::{AccountStatus, Principal, PrincipalInput, Role};
use schoolflow_api::orm::login::{hash_password, validate_password};
use schoolflow_api::orm::principal::{
    email_in_use, find_principal_by_email, insert_principal, list_principals,
    set_password_hash, set_principal_status,
};

use crate::admin_cli::utils::{prompt_for_password, resolve_school_id, search_matcher};

/// Accepts both the stored form (`school_admin`) and the URL form (`school-admin`).
pub fn parse_role(value: &str) -> Result<Role, String> {
    value.replace('-', "_").parse::<Role>().map_err(|e| e.to_string())
}

pub fn parse_status(value: &str) -> Result<AccountStatus, String> {
    value.parse::<AccountStatus>()
}

#[derive(Subcommand)]
pub enum PrincipalAction {
    #[command(about = "List principals, optionally filtered by search term")]
    Ls {
        #[arg(short, long, value_parser = parse_role, help = "Only list this role")]
        role: Option<Role>,
        #[arg(help = "Search term matched against email (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
    },
    #[command(about = "Add a new principal")]
    Add {
        #[arg(short, long, value_parser = parse_role, help = "Role (super-admin, school-admin, teacher)")]
        role: Role,
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "Display name")]
        name: String,
        #[arg(short, long, help = "Password (will be prompted securely if not provided)")]
        password: Option<String>,
        #[arg(short, long, help = "School ID or name (required for school admins and teachers)")]
        school: Option<String>,
    },
    #[command(about = "Change a principal's account status")]
    SetStatus {
        #[arg(help = "Email address")]
        email: String,
        #[arg(value_parser = parse_status, help = "New status (active, pending, suspended, inactive, deleted)")]
        status: AccountStatus,
    },
    #[command(about = "Change a principal's password")]
    ChangePassword {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "New password (will be prompted securely if not provided)")]
        password: Option<String>,
    },
}

pub fn handle_principal_command_with_conn(
    conn: &mut SqliteConnection,
    action: PrincipalAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PrincipalAction::Ls { role, search_term, fixed_string } => {
            principal_ls_impl(conn, role, search_term, fixed_string)?;
        }
        PrincipalAction::Add { role, email, name, password, school } => {
            let password = match password {
                Some(p) => p,
                None => prompt_for_password()?,
            };
            principal_add_impl(conn, role, email, name, password, school)?;
        }
        PrincipalAction::SetStatus { email, status } => {
            principal_set_status_impl(conn, email, status)?;
        }
        PrincipalAction::ChangePassword { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_for_password()?,
            };
            change_password_impl(conn, email, password)?;
        }
    }
    Ok(())
}

/// Looks an email up across every principal table.
fn find_any_principal(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Principal, Box<dyn std::error::Error>> {
    for role in Role::ALL {
        if let Some(principal) = find_principal_by_email(conn, role, email)? {
            return Ok(principal);
        }
    }
    Err(format!("No principal with email '{}'", email).into())
}

fn checked_hash(password: &str) -> Result<String, Box<dyn std::error::Error>> {
    let validation = validate_password(password);
    if !validation.valid {
        return Err(validation.message.into());
    }
    hash_password(password).map_err(|e| format!("Failed to hash password: {}", e).into())
}

pub fn principal_ls_impl(
    conn: &mut SqliteConnection,
    role: Option<Role>,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matches = search_matcher(search_term, fixed_string)?;
    let roles: Vec<Role> = match role {
        Some(role) => vec![role],
        None => Role::ALL.to_vec(),
    };

    let mut principals = Vec::new();
    for role in roles {
        principals.extend(
            list_principals(conn, role)?
                .into_iter()
                .filter(|p| matches(p.email())),
        );
    }

    if principals.is_empty() {
        println!("No principals found.");
        return Ok(());
    }

    println!("Principals:");
    for principal in principals {
        let school = principal
            .school_id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  ID: {}, Role: {}, Email: {}, Name: {}, School: {}, Status: {}",
            principal.id(),
            principal.role(),
            principal.email(),
            principal.name(),
            school,
            principal.status()
        );
    }
    Ok(())
}

pub fn principal_add_impl(
    conn: &mut SqliteConnection,
    role: Role,
    email: String,
    name: String,
    password: String,
    school: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = email.trim().to_string();
    let name = name.trim().to_string();
    if email.is_empty() || name.is_empty() {
        return Err("Email and name are required".into());
    }
    if email_in_use(conn, &email)? {
        return Err(format!("Email '{}' is already registered", email).into());
    }

    let school_id = match (role, school) {
        (Role::SuperAdmin, Some(_)) => {
            return Err("Super admins do not belong to a school".into());
        }
        (Role::SuperAdmin, None) => None,
        (_, Some(school)) => Some(resolve_school_id(conn, &school)?),
        (_, None) => return Err(format!("--school is required for role {}", role).into()),
    };

    let principal = insert_principal(
        conn,
        PrincipalInput {
            role,
            email,
            name,
            password_hash: checked_hash(&password)?,
            status: AccountStatus::Active,
            school_id,
        },
    )?;

    println!("Principal created successfully!");
    println!("ID: {}", principal.id());
    println!("Role: {}", principal.role());
    println!("Email: {}", principal.email());
    Ok(())
}

pub fn principal_set_status_impl(
    conn: &mut SqliteConnection,
    email: String,
    status: AccountStatus,
) -> Result<(), Box<dyn std::error::Error>> {
    let principal = find_any_principal(conn, email.trim())?;
    set_principal_status(conn, principal.role(), principal.id(), status)?;
    println!("{} ({}) is now {}", principal.email(), principal.role(), status);
    Ok(())
}

pub fn change_password_impl(
    conn: &mut SqliteConnection,
    email: String,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let principal = find_any_principal(conn, email.trim())?;
    let password_hash = checked_hash(&password)?;
    set_password_hash(conn, principal.role(), principal.id(), &password_hash)?;
    println!("Password changed successfully for: {}", principal.email());
    Ok(())
}
