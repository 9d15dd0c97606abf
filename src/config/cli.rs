//! Command-line options.
//!
//! Parsed by `clap` in the binary; kept in the library so tests can exercise
//! the parser directly.
//!
//! ```bash
//! # One streaming load with bulk copy
//! bulkload_bench load data/alumnos.csv --strategy bulk-copy --batch-size 5000 --workers 16
//!
//! # Compare every technique over two batch sizes
//! bulkload_bench bench data/alumnos.csv --batch-sizes 1000,5000 --workers 8,16
//!
//! # Add in-memory and 100k-record chunked runs of every scenario
//! bulkload_bench bench data/alumnos.csv --in-memory --chunk-sizes 100000
//!
//! # Produce a fixture file
//! bulkload_bench generate data/alumnos.csv --rows 2500000
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_QUEUE_DEPTH_PER_WORKER, DEFAULT_TABLE, DEFAULT_WORKERS,
};
use crate::config::types::{LogFormat, LogLevel};
use crate::storage::WriteStrategy;

#[derive(Debug, Parser)]
#[command(
    name = "bulkload_bench",
    version,
    about = "Benchmarks strategies for bulk-loading CSV records into PostgreSQL."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream one CSV file into the target table
    Load(LoadCommand),
    /// Run a matrix of load scenarios and report the fastest
    Bench(BenchCommand),
    /// Write a synthetic CSV fixture
    Generate(GenerateCommand),
    /// Truncate the target table
    Reset(TableArgs),
}

#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// Target table
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Create the table if it does not exist
    #[arg(long)]
    pub create_table: bool,
}

#[derive(Debug, Args)]
pub struct LoadCommand {
    /// CSV file to load
    #[arg(value_parser)]
    pub file: PathBuf,

    /// Insertion technique
    #[arg(long, value_enum, default_value_t = WriteStrategy::BulkCopy)]
    pub strategy: WriteStrategy,

    /// Records per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Concurrent writer tasks (0 uses the default)
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Queue slots per writer task
    #[arg(long, default_value_t = DEFAULT_QUEUE_DEPTH_PER_WORKER)]
    pub queue_depth: usize,

    /// Truncate the table before loading
    #[arg(long)]
    pub truncate: bool,

    /// Relax durability settings on every pooled connection during the load
    #[arg(long)]
    pub tune_session: bool,

    /// Create secondary indexes after the load
    #[arg(long)]
    pub create_indexes: bool,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Debug, Args)]
pub struct BenchCommand {
    /// CSV file to load in every scenario
    #[arg(value_parser)]
    pub file: PathBuf,

    /// Techniques to compare
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "multi-statement,multi-row,bulk-copy"
    )]
    pub strategies: Vec<WriteStrategy>,

    /// Batch sizes to compare
    #[arg(long, value_delimiter = ',', default_value = "1000,5000")]
    pub batch_sizes: Vec<usize>,

    /// Writer counts to compare
    #[arg(long, value_delimiter = ',', default_value = "8,16")]
    pub workers: Vec<usize>,

    /// Also run each scenario from a fully materialized record list
    #[arg(long)]
    pub in_memory: bool,

    /// Also run each scenario reading this many records per chunk
    #[arg(long, alias = "chunk-size", value_delimiter = ',')]
    pub chunk_sizes: Vec<usize>,

    /// Relax durability settings on every pooled connection
    #[arg(long)]
    pub tune_session: bool,

    /// Create secondary indexes after the last scenario
    #[arg(long)]
    pub create_indexes: bool,

    /// Write scenario results as JSON to this file
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Output CSV path
    #[arg(value_parser)]
    pub output: PathBuf,

    /// Number of data rows
    #[arg(long, default_value_t = 2_500_000)]
    pub rows: u64,

    /// Seed for reproducible fixtures
    #[arg(long)]
    pub seed: Option<u64>,
}
