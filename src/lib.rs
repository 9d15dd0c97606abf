//! bulkload_bench library: streaming CSV bulk loads into PostgreSQL
//!
//! This library reads a CSV of student records, validates each row, groups the
//! records into batches and writes them through a pool of concurrent writer
//! tasks using one of three insertion techniques. It is built to compare those
//! techniques (and batch sizes and writer counts) against each other.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bulkload_bench::storage::{init_db_pool, PgBatchSink, TableName};
//! use bulkload_bench::{load_streaming, DbConfig, WriteStrategy};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = init_db_pool(&DbConfig::from_env()?, false).await?;
//! let sink = Arc::new(PgBatchSink::new(pool, TableName::default(), WriteStrategy::BulkCopy));
//!
//! let report = load_streaming("data/alumnos.csv", sink, 5000, 16).await?;
//! println!(
//!     "{} records in {:.1}s ({:.0}/s)",
//!     report.records_written,
//!     report.elapsed.as_secs_f64(),
//!     report.records_per_second()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod config;
mod error_handling;
pub mod fixtures;
pub mod initialization;
pub mod pipeline;
pub mod record;
pub mod storage;

// Re-export public API
pub use config::{DbConfig, LoadOptions, LogFormat, LogLevel};
pub use error_handling::{
    ConfigError, DatabaseError, InitializationError, LoadError, LoadStats, ParseError,
    RowDecodeError, SkipReason, WriteError,
};
pub use pipeline::{load_streaming, read_all_records, BatchSink, LoadReport, Loader};
pub use record::{parse_record, Record};
pub use storage::WriteStrategy;
