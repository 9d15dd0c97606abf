//! Configuration types.
//!
//! This module defines enums and structs used for logging setup and for
//! tuning a load run.

use clap::ValueEnum;

use crate::config::constants::{DEFAULT_BATCH_SIZE, DEFAULT_QUEUE_DEPTH_PER_WORKER, DEFAULT_WORKERS};
use crate::error_handling::LoadError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Tuning knobs for one load run.
///
/// # Examples
///
/// ```
/// use bulkload_bench::LoadOptions;
///
/// let options = LoadOptions {
///     batch_size: 5000,
///     workers: 16,
///     ..Default::default()
/// };
/// assert_eq!(options.queue_capacity(), 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Records per batch (must be at least 1)
    pub batch_size: usize,
    /// Concurrent writer tasks (0 falls back to the default)
    pub workers: usize,
    /// Queue slots per writer task (0 is treated as 1)
    pub queue_depth_per_worker: usize,
}

impl LoadOptions {
    pub fn new(batch_size: usize, workers: usize) -> Self {
        Self {
            batch_size,
            workers,
            ..Default::default()
        }
    }

    /// Writer count actually started.
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            DEFAULT_WORKERS
        } else {
            self.workers
        }
    }

    /// Bounded queue capacity, a small multiple of the writer count.
    pub fn queue_capacity(&self) -> usize {
        self.effective_workers()
            .saturating_mul(self.queue_depth_per_worker.max(1))
    }

    /// Rejects options that cannot describe a run.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.batch_size == 0 {
            return Err(LoadError::InvalidOptions(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            workers: DEFAULT_WORKERS,
            queue_depth_per_worker: DEFAULT_QUEUE_DEPTH_PER_WORKER,
        }
    }
}
