//! SchoolFlow administrative CLI.
//!
//! Operates directly on the SQLite database named by `DATABASE_URL` using the
//! ORM functions from `schoolflow-api`: create schools and principals, change
//! account and subscription statuses, reset passwords, and inspect or revoke
//! sessions.

use clap::{Parser, Subcommand};

mod admin_cli;

use admin_cli::{
    PrincipalAction, SchoolAction, SessionAction, establish_connection,
    handle_principal_command_with_conn, handle_school_command_with_conn,
    handle_session_command_with_conn,
};

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[command(name = "schoolflow-admin")]
#[command(about = "Administrative CLI for SchoolFlow database management")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Print build information and exit")]
    version_info: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage schools")]
    School {
        #[command(subcommand)]
        action: SchoolAction,
    },
    #[command(about = "Manage super admins, school admins and teachers")]
    Principal {
        #[command(subcommand)]
        action: PrincipalAction,
    },
    #[command(about = "Inspect and revoke sessions")]
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

fn print_version_info() {
    println!("schoolflow-admin {}", built_info::PKG_VERSION);
    println!("Built: {}", built_info::BUILT_TIME_UTC);
    if let Some(commit) = built_info::GIT_COMMIT_HASH_SHORT {
        println!("Commit: {}", commit);
    }
    println!("Target: {}", built_info::TARGET);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.version_info {
        print_version_info();
        return Ok(());
    }

    let Some(command) = cli.command else {
        return Err("No command given; run with --help for usage".into());
    };

    let mut conn = establish_connection()?;
    match command {
        Commands::School { action } => handle_school_command_with_conn(&mut conn, action)?,
        Commands::Principal { action } => handle_principal_command_with_conn(&mut conn, action)?,
        Commands::Session { action } => handle_session_command_with_conn(&mut conn, action)?,
    }

    Ok(())
}
