use chrono::DateTime;
use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use schoolflow_api::orm::session::{
    delete_session_by_id, list_all_sessions, now_millis, purge_expired_sessions,
};

use crate::admin_cli::utils::confirm;

#[derive(Subcommand)]
pub enum SessionAction {
    #[command(about = "List stored sessions")]
    Ls {
        #[arg(short, long, help = "Include sessions that have already expired")]
        all: bool,
    },
    #[command(about = "Revoke a session by ID")]
    Rm {
        #[arg(help = "Session ID")]
        id: i32,
    },
    #[command(about = "Delete every expired session row")]
    PurgeExpired {
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
}

pub fn handle_session_command_with_conn(
    conn: &mut SqliteConnection,
    action: SessionAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Ls { all } => session_ls_impl(conn, all)?,
        SessionAction::Rm { id } => session_rm_impl(conn, id)?,
        SessionAction::PurgeExpired { yes } => {
            if !yes && !confirm("Delete all expired sessions?")? {
                println!("Aborted.");
                return Ok(());
            }
            session_purge_impl(conn, now_millis())?;
        }
    }
    Ok(())
}

fn format_expiry(expires_at: i64) -> String {
    DateTime::from_timestamp_millis(expires_at)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| expires_at.to_string())
}

pub fn session_ls_impl(
    conn: &mut SqliteConnection,
    include_expired: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = now_millis();
    let sessions: Vec<_> = list_all_sessions(conn)?
        .into_iter()
        .filter(|s| include_expired || !s.is_expired_at(now))
        .collect();

    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    println!("Sessions:");
    for session in sessions {
        let state = if session.is_expired_at(now) { " (expired)" } else { "" };
        println!(
            "  ID: {}, Role: {}, User: {}, IP: {}, Device: {} / {} / {}, Expires: {}{}",
            session.id,
            session.role,
            session.user_id,
            session.ip_address,
            session.device,
            session.browser,
            session.os,
            format_expiry(session.expires_at),
            state
        );
    }
    Ok(())
}

pub fn session_rm_impl(
    conn: &mut SqliteConnection,
    session_id: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    if delete_session_by_id(conn, session_id)? == 0 {
        return Err(format!("Session {} not found", session_id).into());
    }
    println!("Session {} revoked", session_id);
    Ok(())
}

pub fn session_purge_impl(
    conn: &mut SqliteConnection,
    now_millis: i64,
) -> Result<usize, Box<dyn std::error::Error>> {
    let removed = purge_expired_sessions(conn, now_millis)?;
    println!("Removed {} expired session(s)", removed);
    Ok(removed)
}
