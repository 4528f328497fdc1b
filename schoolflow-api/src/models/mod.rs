pub mod principal;
pub mod role;
pub mod school;
pub mod session;

// Re-export models for easier access
pub use principal::*;
pub use role::*;
pub use school::*;
pub use session::*;
