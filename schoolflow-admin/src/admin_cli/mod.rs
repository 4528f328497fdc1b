pub mod principal_commands;
pub mod school_commands;
pub mod session_commands;
pub mod utils;

pub use principal_commands::{PrincipalAction, handle_principal_command_with_conn};
pub use school_commands::{SchoolAction, handle_school_command_with_conn};
pub use session_commands::{SessionAction, handle_session_command_with_conn};
pub use utils::establish_connection;
