//! Subcommand implementations used by the binary.

use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::app::bench::{run_bench, scenario_matrix, write_json, LoadMode, ScenarioResult};
use crate::app::logging::spawn_progress_logger;
use crate::app::shutdown::stop_progress_logger;
use crate::app::statistics::{print_bench_results, print_load_summary, print_skip_statistics};
use crate::config::cli::{BenchCommand, GenerateCommand, LoadCommand, TableArgs};
use crate::config::{DbConfig, LoadOptions, PROGRESS_LOGGING_INTERVAL};
use crate::fixtures::generate_csv;
use crate::pipeline::{LoadReport, Loader};
use crate::storage::{
    count_rows, create_indexes, create_table, init_db_pool, restore_session, truncate,
    PgBatchSink, TableName,
};

async fn prepare_table(pool: &PgPool, args: &TableArgs) -> Result<TableName> {
    let table = TableName::new(args.table.as_str()).context("Invalid --table")?;
    if args.create_table {
        create_table(pool, &table)
            .await
            .with_context(|| format!("Failed to create table {table}"))?;
    }
    Ok(table)
}

/// Builds the secondary indexes on a connection with default session settings.
async fn build_indexes(pool: &PgPool, table: &TableName, tuned: bool) -> Result<()> {
    let mut conn = pool
        .acquire()
        .await
        .context("Failed to acquire a connection for index builds")?;
    if tuned {
        restore_session(&mut conn).await;
    }
    create_indexes(&mut conn, table).await;
    Ok(())
}

/// Streams one file into the target table.
pub async fn run_load(db: &DbConfig, cmd: &LoadCommand) -> Result<LoadReport> {
    let pool = init_db_pool(db, cmd.tune_session)
        .await
        .context("Failed to initialize database pool")?;
    let table = prepare_table(&pool, &cmd.table).await?;

    if cmd.truncate {
        truncate(&pool, &table)
            .await
            .with_context(|| format!("Failed to truncate {table}"))?;
    }

    let options = LoadOptions {
        batch_size: cmd.batch_size,
        workers: cmd.workers,
        queue_depth_per_worker: cmd.queue_depth,
    };
    let sink = Arc::new(PgBatchSink::new(pool.clone(), table.clone(), cmd.strategy));
    let loader = Loader::new(sink, options);

    let cancel = CancellationToken::new();
    let logging_task =
        spawn_progress_logger(loader.stats(), PROGRESS_LOGGING_INTERVAL, cancel.child_token());
    let outcome = loader.load_path(&cmd.file).await;
    stop_progress_logger(cancel, Some(logging_task)).await;

    let report = outcome.with_context(|| format!("Load of {} failed", cmd.file.display()))?;
    print_skip_statistics(&loader.stats());
    print_load_summary(&report);

    let rows = count_rows(&pool, &table).await?;
    info!("{} now holds {} rows", table, rows);

    if cmd.create_indexes {
        build_indexes(&pool, &table, cmd.tune_session).await?;
    }
    pool.close().await;
    Ok(report)
}

/// Runs the scenario matrix and prints the comparison table.
pub async fn run_bench_command(db: &DbConfig, cmd: &BenchCommand) -> Result<Vec<ScenarioResult>> {
    let pool = init_db_pool(db, cmd.tune_session)
        .await
        .context("Failed to initialize database pool")?;
    let table = prepare_table(&pool, &cmd.table).await?;

    let modes = LoadMode::selection(cmd.in_memory, &cmd.chunk_sizes);
    let scenarios = scenario_matrix(&cmd.strategies, &cmd.batch_sizes, &cmd.workers, &modes);
    anyhow::ensure!(!scenarios.is_empty(), "No scenarios to run");
    info!("Running {} scenarios against {}", scenarios.len(), table);

    let results = run_bench(&pool, &table, &cmd.file, &scenarios).await;
    print_bench_results(&results);

    if let Some(path) = &cmd.json_output {
        write_json(path, &results)?;
    }
    if cmd.create_indexes {
        build_indexes(&pool, &table, cmd.tune_session).await?;
    }
    pool.close().await;
    Ok(results)
}

/// Writes a synthetic fixture file.
pub fn run_generate(cmd: &GenerateCommand) -> Result<()> {
    let file = File::create(&cmd.output)
        .with_context(|| format!("Failed to create {}", cmd.output.display()))?;
    let mut rng = match cmd.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    generate_csv(BufWriter::new(file), cmd.rows, &mut rng)
        .with_context(|| format!("Failed to write {}", cmd.output.display()))?;
    info!("Wrote {} rows to {}", cmd.rows, cmd.output.display());
    Ok(())
}

/// Empties the target table.
pub async fn run_reset(db: &DbConfig, args: &TableArgs) -> Result<()> {
    let pool = init_db_pool(db, false)
        .await
        .context("Failed to initialize database pool")?;
    let table = prepare_table(&pool, args).await?;
    truncate(&pool, &table)
        .await
        .with_context(|| format!("Failed to truncate {table}"))?;
    pool.close().await;
    Ok(())
}
