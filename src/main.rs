//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `bulkload_bench` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use bulkload_bench::app::{run_bench_command, run_generate, run_load, run_reset};
use bulkload_bench::config::cli::{Cli, Command};
use bulkload_bench::initialization::init_logger_with;
use bulkload_bench::DbConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // DB_* settings usually live in .env: current directory first, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(cli.command).await {
        eprintln!("bulkload_bench error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate(cmd) => run_generate(&cmd),
        Command::Load(cmd) => {
            let db = DbConfig::from_env().context("Failed to read database settings")?;
            let report = run_load(&db, &cmd).await?;
            println!(
                "Loaded {} record{} ({} skipped) in {:.2}s - {:.0} records/sec",
                report.records_written,
                if report.records_written == 1 { "" } else { "s" },
                report.records_skipped,
                report.elapsed.as_secs_f64(),
                report.records_per_second()
            );
            Ok(())
        }
        Command::Bench(cmd) => {
            let db = DbConfig::from_env().context("Failed to read database settings")?;
            let results = run_bench_command(&db, &cmd).await?;
            let failed = results.iter().filter(|r| !r.succeeded()).count();
            println!("Ran {} scenarios ({} failed)", results.len(), failed);
            Ok(())
        }
        Command::Reset(args) => {
            let db = DbConfig::from_env().context("Failed to read database settings")?;
            run_reset(&db, &args).await?;
            println!("Truncated {}", args.table);
            Ok(())
        }
    }
}
