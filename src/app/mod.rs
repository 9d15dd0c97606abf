//! Main application modules.
//!
//! This module provides the subcommand implementations, the benchmark runner,
//! progress logging and summary printing used by the binary.

pub mod bench;
pub mod commands;
pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use bench::{fastest, run_bench, scenario_matrix, LoadMode, Scenario, ScenarioResult};
pub use commands::{run_bench_command, run_generate, run_load, run_reset};
pub use logging::{log_progress, spawn_progress_logger};
pub use shutdown::stop_progress_logger;
pub use statistics::{format_bench_table, print_bench_results, print_load_summary};
