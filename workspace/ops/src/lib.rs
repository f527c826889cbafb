//! Business operations for the retail ERP core.
//!
//! Each module takes the acting role explicitly where it mutates state;
//! nothing here reads ambient session state, logs to the user, or leaks
//! storage errors past [`error::OpsError`].

pub mod auth;
pub mod error;
pub mod export;
pub mod finance;
pub mod products;
pub mod reports;
pub mod sales;
pub mod seed;

pub use error::{OpsError, Result};
