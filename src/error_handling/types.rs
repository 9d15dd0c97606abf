//! Error type definitions.
//!
//! This module defines every error raised by the loader, from per-row decode
//! failures (recovered locally) up to write failures (fatal to a run).

use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::pipeline::BatchRange;
use crate::storage::WriteStrategy;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for database maintenance operations (schema, counts, pool setup).
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The configured target table name is not a plain SQL identifier.
    #[error("Invalid table name '{0}': use lowercase letters, digits and underscores")]
    InvalidTableName(String),

    /// Connection settings could not be turned into connect options.
    #[error("Database configuration error: {0}")]
    Config(#[from] ConfigError),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Error types for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing environment variable {0}")]
    MissingVar(&'static str),

    /// An environment variable holds a value that cannot be used.
    #[error("Invalid value for {name}: {value}")]
    InvalidVar {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// `DATABASE_URL` could not be parsed as a PostgreSQL URL.
    #[error("Invalid DATABASE_URL: {0}")]
    InvalidUrl(#[source] sqlx::Error),
}

/// A record failed field validation.
///
/// Recovered locally: the record is skipped and the stream continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than the 8 required positional fields were present.
    #[error("missing field '{field}' (index {index}): row has only {found} fields")]
    MissingField {
        /// Name of the first absent field
        field: &'static str,
        /// Positional index of that field
        index: usize,
        /// Number of fields present in the row
        found: usize,
    },

    /// A date field is not in `YYYY-MM-DD` form.
    #[error("field '{field}' is not a YYYY-MM-DD date: '{value}'")]
    InvalidDate {
        /// Name of the date field
        field: &'static str,
        /// Trimmed raw value
        value: String,
    },

    /// The enrollment number is not an integer.
    #[error("field 'nro_legajo' is not an integer: '{value}'")]
    InvalidEnrollmentNumber {
        /// Trimmed raw value
        value: String,
    },
}

/// A row could not be decoded from the input stream.
///
/// Recovered locally: the row is skipped and the stream continues.
#[derive(Error, Debug)]
#[error("failed to decode row after line {line}: {source}")]
pub struct RowDecodeError {
    /// Last line number the reader reached
    pub line: u64,
    /// Underlying CSV reader error
    #[source]
    pub source: csv_async::Error,
}

/// A batch write failed.
///
/// Fatal to the run: the coordinator stops accepting batches, lets in-flight
/// writes finish and reports this error.
#[derive(Error, Debug)]
#[error("{strategy} write failed for {range}: {source}")]
pub struct WriteError {
    /// Technique that was writing the batch
    pub strategy: WriteStrategy,
    /// Which records the batch covered
    pub range: BatchRange,
    /// Driver or transport failure
    #[source]
    pub source: sqlx::Error,
}

/// Errors that end a load run.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The input stream could not be opened. No batch was processed.
    #[error("Failed to open source {}: {source}", path.display())]
    SourceOpen {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Load options were rejected before the run started.
    #[error("Invalid load options: {0}")]
    InvalidOptions(String),

    /// The first batch write failure observed by the pool.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// A writer task panicked instead of returning.
    #[error("Writer task panicked: {0}")]
    WorkerPanicked(String),
}

/// Reasons a row or record was skipped without aborting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum SkipReason {
    /// The CSV reader could not decode the row
    RowDecode,
    /// The row had fewer than 8 fields
    MissingField,
    /// A date field did not parse
    InvalidDate,
    /// The enrollment number was not an integer
    InvalidEnrollmentNumber,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::RowDecode => "Row decode error",
            SkipReason::MissingField => "Missing field",
            SkipReason::InvalidDate => "Invalid date",
            SkipReason::InvalidEnrollmentNumber => "Invalid enrollment number",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ParseError> for SkipReason {
    fn from(e: &ParseError) -> Self {
        match e {
            ParseError::MissingField { .. } => SkipReason::MissingField,
            ParseError::InvalidDate { .. } => SkipReason::InvalidDate,
            ParseError::InvalidEnrollmentNumber { .. } => SkipReason::InvalidEnrollmentNumber,
        }
    }
}
