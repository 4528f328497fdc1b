use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use schoolflow_api::orm::school::{insert_school, list_schools, set_school_status};

use crate::admin_cli::utils::{resolve_school_id, search_matcher};

/// Subscription states a school can be put in by an operator.
pub const SCHOOL_STATUSES: [&str; 3] = ["pending", "active", "suspended"];

#[derive(Subcommand)]
pub enum SchoolAction {
    #[command(about = "List schools, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
    },
    #[command(about = "Add a new school")]
    Add {
        #[arg(short, long, help = "School name")]
        name: String,
        #[arg(short, long, default_value = "active", help = "Initial status (pending, active, suspended)")]
        status: String,
    },
    #[command(about = "Change a school's subscription status")]
    SetStatus {
        #[arg(help = "School ID or name")]
        school: String,
        #[arg(help = "New status (pending, active, suspended)")]
        status: String,
    },
}

pub fn handle_school_command_with_conn(
    conn: &mut SqliteConnection,
    action: SchoolAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SchoolAction::Ls { search_term, fixed_string } => {
            school_ls_impl(conn, search_term, fixed_string)?;
        }
        SchoolAction::Add { name, status } => {
            school_add_impl(conn, name, status)?;
        }
        SchoolAction::SetStatus { school, status } => {
            school_set_status_impl(conn, school, status)?;
        }
    }
    Ok(())
}

fn check_school_status(status: &str) -> Result<(), Box<dyn std::error::Error>> {
    if SCHOOL_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid school status '{}'. Expected one of: {}",
            status,
            SCHOOL_STATUSES.join(", ")
        )
        .into())
    }
}

pub fn school_ls_impl(
    conn: &mut SqliteConnection,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matches = search_matcher(search_term, fixed_string)?;
    let schools: Vec<_> = list_schools(conn)?
        .into_iter()
        .filter(|school| matches(&school.name))
        .collect();

    if schools.is_empty() {
        println!("No schools found.");
    } else {
        println!("Schools:");
        for school in schools {
            println!(
                "  ID: {}, Name: {}, Status: {}, Created: {}",
                school.id, school.name, school.status, school.created_at
            );
        }
    }

    Ok(())
}

pub fn school_add_impl(
    conn: &mut SqliteConnection,
    name: String,
    status: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = name.trim();
    if name.is_empty() {
        return Err("School name cannot be empty".into());
    }
    check_school_status(&status)?;

    if list_schools(conn)?
        .iter()
        .any(|school| school.name.eq_ignore_ascii_case(name))
    {
        return Err(format!("School '{}' already exists", name).into());
    }

    let school = insert_school(conn, name, &status)?;
    println!("School created successfully!");
    println!("ID: {}", school.id);
    println!("Name: {}", school.name);
    println!("Status: {}", school.status);

    Ok(())
}

pub fn school_set_status_impl(
    conn: &mut SqliteConnection,
    school: String,
    status: String,
) -> Result<(), Box<dyn std::error::Error>> {
    check_school_status(&status)?;
    let school_id = resolve_school_id(conn, &school)?;
    set_school_status(conn, school_id, &status)?;
    println!("School {} is now {}", school_id, status);
    Ok(())
}
