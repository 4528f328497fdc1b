mod db;
pub mod login;
pub mod principal;
pub mod school;
pub mod session;
pub mod testing;

pub use db::*;
