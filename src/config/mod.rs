//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, limits, CSV layout)
//! - Database connection settings
//! - Load tuning options
//! - CLI option types and parsing

pub mod cli;
mod constants;
mod database;
mod types;

// Re-export all constants
pub use constants::*;
pub use database::DbConfig;
pub use types::{LoadOptions, LogFormat, LogLevel};
