// Shared test helpers for sinks, CSV fixtures and database setup.
//
// This module provides common utilities used across multiple test files to reduce duplication.

#![allow(dead_code)] // Each test file uses a different subset

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bulkload_bench::pipeline::{Batch, BatchSink};
use bulkload_bench::storage::{create_table, TableName, WriteStrategy};
use bulkload_bench::{Record, WriteError};
use sqlx::PgPool;
use tempfile::TempDir;

pub const HEADER: &str =
    "apellido,nombre,nro_documento,tipo_documento,fecha_nacimiento,sexo,nro_legajo,fecha_ingreso";

/// In-memory sink that keeps every record it is given.
pub struct MemorySink {
    records: Mutex<Vec<Record>>,
    calls: AtomicUsize,
    fail_sequence: Option<u64>,
    delay: Duration,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail_sequence: None,
            delay: Duration::ZERO,
        }
    }

    /// Fails the batch with this sequence number instead of storing it.
    pub fn failing_on(sequence: u64) -> Self {
        Self {
            fail_sequence: Some(sequence),
            ..Self::new()
        }
    }

    /// Sleeps before every write to simulate a slow store.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub fn enrollment_numbers(&self) -> Vec<String> {
        let mut numbers: Vec<String> = self
            .records()
            .into_iter()
            .map(|r| r.enrollment_number)
            .collect();
        numbers.sort_by_key(|n| n.parse::<i64>().unwrap_or(i64::MAX));
        numbers
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BatchSink for MemorySink {
    async fn write_batch(&self, batch: &Batch) -> Result<(), WriteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let range = batch.range();
        if Some(range.sequence) == self.fail_sequence {
            return Err(WriteError {
                strategy: WriteStrategy::MultiRow,
                range,
                source: sqlx::Error::Protocol("simulated write failure".into()),
            });
        }
        self.records
            .lock()
            .unwrap()
            .extend(batch.records().iter().cloned());
        Ok(())
    }

    fn name(&self) -> String {
        "memory".to_string()
    }
}

/// A valid data row whose enrollment number is `i`.
pub fn valid_row(i: usize) -> String {
    format!(
        "Apellido{i},Nombre{i},{},DNI,1990-05-17,{},{i},2015-03-01",
        30_000_000 + i,
        if i % 2 == 0 { "M" } else { "F" }
    )
}

pub fn valid_rows(count: usize) -> Vec<String> {
    (1..=count).map(valid_row).collect()
}

/// Writes `HEADER` plus `rows` to a file inside `dir`.
pub fn write_csv(dir: &TempDir, name: &str, rows: &[String]) -> PathBuf {
    let path = dir.path().join(name);
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).expect("Failed to write CSV fixture");
    path
}

/// Connects to `DATABASE_URL`, or returns `None` so the caller can skip.
pub async fn pg_pool() -> Option<PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
            return None;
        }
    };
    Some(
        PgPool::connect(&url)
            .await
            .expect("Failed to connect to DATABASE_URL"),
    )
}

/// Creates a fresh table whose name no other test uses.
pub async fn scratch_table(pool: &PgPool, prefix: &str) -> TableName {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    let table = TableName::new(format!("{prefix}_{}_{nanos}", std::process::id()))
        .expect("Valid scratch table name");
    sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
        .execute(pool)
        .await
        .expect("Failed to drop stale table");
    create_table(pool, &table)
        .await
        .expect("Failed to create scratch table");
    table
}

pub async fn drop_table(pool: &PgPool, table: &TableName) {
    let _ = sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
        .execute(pool)
        .await;
}
