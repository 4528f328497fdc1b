use std::io::{self, Write};

use diesel::{prelude::*, sqlite::SqliteConnection};
use dotenvy::dotenv;
use regex::Regex;
use rpassword::read_password;
use schoolflow_api::orm::school::{get_school, list_schools};
use schoolflow_api::orm::{run_pending_migrations, set_foreign_keys};

pub fn establish_connection() -> Result<SqliteConnection, Box<dyn std::error::Error>> {
    dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let mut conn = SqliteConnection::establish(&database_url)?;
    set_foreign_keys(&mut conn)?;
    run_pending_migrations(&mut conn).map_err(|e| format!("Migrations failed: {}", e))?;
    Ok(conn)
}

/// Resolve a school identifier (either ID or name) to a school ID.
///
/// Numeric input is treated as an ID and must exist; anything else is matched
/// against school names case-insensitively.
pub fn resolve_school_id(
    conn: &mut SqliteConnection,
    school_identifier: &str,
) -> Result<i32, Box<dyn std::error::Error>> {
    if let Ok(id) = school_identifier.parse::<i32>() {
        return match get_school(conn, id)? {
            Some(_) => Ok(id),
            None => Err(format!("School with ID {} does not exist", id).into()),
        };
    }

    list_schools(conn)?
        .into_iter()
        .find(|school| school.name.eq_ignore_ascii_case(school_identifier))
        .map(|school| school.id)
        .ok_or_else(|| format!("School with name '{}' does not exist", school_identifier).into())
}

/// Builds a matcher for `ls`-style search terms: regex by default, plain
/// substring with `fixed_string`.
pub fn search_matcher(
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<Box<dyn Fn(&str) -> bool>, Box<dyn std::error::Error>> {
    match search_term {
        None => Ok(Box::new(|_| true)),
        Some(term) if fixed_string => Ok(Box::new(move |value| value.contains(&term))),
        Some(term) => {
            let regex = Regex::new(&term)
                .map_err(|e| format!("Invalid regex pattern '{}': {}", term, e))?;
            Ok(Box::new(move |value| regex.is_match(value)))
        }
    }
}

pub fn prompt_for_password() -> Result<String, Box<dyn std::error::Error>> {
    print!("Enter new password: ");
    io::stdout().flush()?;
    let password = read_password()?;

    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }

    print!("Confirm new password: ");
    io::stdout().flush()?;
    let confirm_password = read_password()?;

    if password != confirm_password {
        return Err("Passwords do not match".into());
    }

    Ok(password)
}

pub fn confirm(prompt: &str) -> Result<bool, Box<dyn std::error::Error>> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
