//! Benchmark runner: a matrix of load scenarios against one table.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::app::logging::spawn_progress_logger;
use crate::app::shutdown::stop_progress_logger;
use crate::config::{LoadOptions, PROGRESS_LOGGING_INTERVAL};
use crate::error_handling::{LoadError, LoadStats};
use crate::pipeline::Loader;
use crate::storage::{count_rows, truncate, PgBatchSink, TableName, WriteStrategy};

/// Where records come from during a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadMode {
    /// Parse and write concurrently while reading the file
    Streaming,
    /// Read the whole file first, then write (reading is timed too)
    InMemory,
    /// Read `chunk_size` records, write them, then read the next chunk
    Chunked { chunk_size: usize },
}

impl LoadMode {
    /// Streaming always, then in-memory when requested, then one chunked
    /// mode per chunk size.
    pub fn selection(in_memory: bool, chunk_sizes: &[usize]) -> Vec<LoadMode> {
        let mut modes = vec![LoadMode::Streaming];
        if in_memory {
            modes.push(LoadMode::InMemory);
        }
        modes.extend(
            chunk_sizes
                .iter()
                .map(|&chunk_size| LoadMode::Chunked { chunk_size }),
        );
        modes
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Streaming => f.write_str("streaming"),
            LoadMode::InMemory => f.write_str("in-memory"),
            LoadMode::Chunked { chunk_size } => write!(f, "chunked {chunk_size}"),
        }
    }
}

/// One benchmark configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub strategy: WriteStrategy,
    pub batch_size: usize,
    pub workers: usize,
    pub mode: LoadMode,
}

impl Scenario {
    pub fn label(&self) -> String {
        format!(
            "{} {} (batch {}, {} workers)",
            self.strategy, self.mode, self.batch_size, self.workers
        )
    }

    fn options(&self) -> LoadOptions {
        LoadOptions::new(self.batch_size, self.workers)
    }
}

/// Measured outcome of one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    #[serde(flatten)]
    pub scenario: Scenario,
    pub elapsed_seconds: f64,
    /// Rows in the table after the run (it is truncated before each scenario)
    pub rows_in_table: i64,
    pub records_per_second: f64,
    pub error: Option<String>,
}

impl ScenarioResult {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Every combination of mode, strategy, batch size and worker count, grouped
/// by mode in the order given.
pub fn scenario_matrix(
    strategies: &[WriteStrategy],
    batch_sizes: &[usize],
    workers: &[usize],
    modes: &[LoadMode],
) -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    for &mode in modes {
        for &strategy in strategies {
            for &batch_size in batch_sizes {
                for &worker_count in workers {
                    scenarios.push(Scenario {
                        strategy,
                        batch_size,
                        workers: worker_count,
                        mode,
                    });
                }
            }
        }
    }
    scenarios
}

/// Successful scenario with the shortest time.
pub fn fastest(results: &[ScenarioResult]) -> Option<&ScenarioResult> {
    results
        .iter()
        .filter(|r| r.succeeded())
        .min_by(|a, b| a.elapsed_seconds.total_cmp(&b.elapsed_seconds))
}

/// Runs every scenario in order, truncating `table` before each one.
///
/// A failing scenario is recorded and the next one still runs.
pub async fn run_bench(
    pool: &PgPool,
    table: &TableName,
    file: &Path,
    scenarios: &[Scenario],
) -> Vec<ScenarioResult> {
    let mut results = Vec::with_capacity(scenarios.len());
    for (i, scenario) in scenarios.iter().enumerate() {
        info!("Scenario {}/{}: {}", i + 1, scenarios.len(), scenario.label());
        let result = run_scenario(pool, table, file, scenario).await;
        match &result.error {
            None => info!(
                "{} rows in {:.2}s (~{:.0} records/sec)",
                result.rows_in_table, result.elapsed_seconds, result.records_per_second
            ),
            Some(e) => warn!("Scenario failed: {e}"),
        }
        results.push(result);
    }
    results
}

async fn run_scenario(
    pool: &PgPool,
    table: &TableName,
    file: &Path,
    scenario: &Scenario,
) -> ScenarioResult {
    let failed = |error: String, elapsed: Duration, rows: i64| ScenarioResult {
        scenario: scenario.clone(),
        elapsed_seconds: elapsed.as_secs_f64(),
        rows_in_table: rows,
        records_per_second: 0.0,
        error: Some(error),
    };

    if let Err(e) = truncate(pool, table).await {
        return failed(format!("truncate failed: {e}"), Duration::ZERO, 0);
    }

    let sink = Arc::new(PgBatchSink::new(pool.clone(), table.clone(), scenario.strategy));
    let stats = Arc::new(LoadStats::new());
    let loader = Loader::new(sink, scenario.options()).with_stats(Arc::clone(&stats));

    let cancel = CancellationToken::new();
    let logging_task = spawn_progress_logger(stats, PROGRESS_LOGGING_INTERVAL, cancel.child_token());

    let started = Instant::now();
    let outcome = match scenario.mode {
        LoadMode::Streaming => loader.load_path(file).await.map(|_| ()),
        LoadMode::InMemory => load_in_memory(&loader, file).await,
        LoadMode::Chunked { chunk_size } => {
            loader.load_chunked(file, chunk_size).await.map(|_| ())
        }
    };
    let elapsed = started.elapsed();
    stop_progress_logger(cancel, Some(logging_task)).await;

    let rows = match count_rows(pool, table).await {
        Ok(rows) => rows,
        Err(e) => return failed(format!("count failed: {e}"), elapsed, 0),
    };

    match outcome {
        Ok(()) => {
            let secs = elapsed.as_secs_f64();
            ScenarioResult {
                scenario: scenario.clone(),
                elapsed_seconds: secs,
                rows_in_table: rows,
                records_per_second: if secs > 0.0 { rows as f64 / secs } else { 0.0 },
                error: None,
            }
        }
        Err(e) => failed(e.to_string(), elapsed, rows),
    }
}

async fn load_in_memory(loader: &Loader, file: &Path) -> Result<(), LoadError> {
    let records = loader.read_all(file).await?;
    loader.load_records(records).await.map(|_| ())
}

/// Writes scenario results as pretty-printed JSON.
pub fn write_json(path: &Path, results: &[ScenarioResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results).context("Failed to serialize results")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    info!("Saved {} scenario results to {}", results.len(), path.display());
    Ok(())
}
