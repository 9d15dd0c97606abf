//! Error handling and load statistics.
//!
//! This module provides:
//! - Error type definitions for every stage of a load run
//! - Skip reasons for rows and records that are recovered locally
//! - Thread-safe load statistics shared by reader and writers
//!
//! Only write failures abort a run. Decode and parse failures are counted,
//! logged and skipped.

mod stats;
mod types;

// Re-export public API
pub use stats::LoadStats;
pub use types::{
    ConfigError, DatabaseError, InitializationError, LoadError, ParseError, RowDecodeError,
    SkipReason, WriteError,
};
