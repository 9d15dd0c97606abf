//! Insertion techniques.
//!
//! Every technique writes one batch atomically inside its own transaction and
//! binds dates as `YYYY-MM-DD` text cast to `date`, so the stored rows do not
//! depend on which technique wrote them.

use std::fmt;
use std::io;

use clap::ValueEnum;
use log::debug;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use strum_macros::EnumIter;

use crate::config::{CSV_HEADER, PG_MAX_BIND_PARAMS};
use crate::record::Record;

use super::table::TableName;

/// Column positions that hold dates.
const DATE_COLUMNS: [usize; 2] = [4, 7];

/// Records per multi-row statement; PostgreSQL caps bind parameters per statement.
pub const MULTI_ROW_CHUNK: usize = PG_MAX_BIND_PARAMS / CSV_HEADER.len();

/// How a batch is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, EnumIter, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteStrategy {
    /// One prepared INSERT per record, all in one transaction
    MultiStatement,
    /// One INSERT carrying a value tuple per record
    MultiRow,
    /// `COPY ... FROM STDIN` streaming the batch as CSV
    BulkCopy,
}

impl WriteStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteStrategy::MultiStatement => "multi-statement",
            WriteStrategy::MultiRow => "multi-row",
            WriteStrategy::BulkCopy => "bulk-copy",
        }
    }

    /// Writes `records` into `table` with this technique.
    ///
    /// Either every record is committed or none is.
    pub async fn write(
        &self,
        pool: &PgPool,
        table: &TableName,
        records: &[Record],
    ) -> Result<(), sqlx::Error> {
        if records.is_empty() {
            return Ok(());
        }
        match self {
            WriteStrategy::MultiStatement => write_multi_statement(pool, table, records).await,
            WriteStrategy::MultiRow => write_multi_row(pool, table, records).await,
            WriteStrategy::BulkCopy => write_bulk_copy(pool, table, records).await,
        }
    }
}

impl fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-row INSERT with positional placeholders, dates cast to `date`.
pub fn insert_sql(table: &TableName) -> String {
    let placeholders: Vec<String> = (0..CSV_HEADER.len())
        .map(|i| {
            if DATE_COLUMNS.contains(&i) {
                format!("${}::date", i + 1)
            } else {
                format!("${}", i + 1)
            }
        })
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        TableName::column_list(),
        placeholders.join(", ")
    )
}

pub fn copy_sql(table: &TableName) -> String {
    format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT csv)",
        table,
        TableName::column_list()
    )
}

/// Serializes records as headerless, fully quoted CSV for `COPY`.
pub fn copy_payload(records: &[Record]) -> io::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record.text_fields())?;
    }
    writer.into_inner().map_err(|e| e.into_error())
}

async fn write_multi_statement(
    pool: &PgPool,
    table: &TableName,
    records: &[Record],
) -> Result<(), sqlx::Error> {
    let sql = insert_sql(table);
    let mut tx = pool.begin().await?;
    for record in records {
        let [f0, f1, f2, f3, f4, f5, f6, f7] = record.text_fields();
        // Same SQL text each time, so the connection reuses one prepared statement.
        sqlx::query(&sql)
            .bind(f0)
            .bind(f1)
            .bind(f2)
            .bind(f3)
            .bind(f4)
            .bind(f5)
            .bind(f6)
            .bind(f7)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}

async fn write_multi_row(
    pool: &PgPool,
    table: &TableName,
    records: &[Record],
) -> Result<(), sqlx::Error> {
    let prefix = format!("INSERT INTO {} ({}) ", table, TableName::column_list());
    let mut tx = pool.begin().await?;
    for chunk in records.chunks(MULTI_ROW_CHUNK) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(&prefix);
        builder.push_values(chunk, |mut row, record| {
            for (i, value) in record.text_fields().into_iter().enumerate() {
                row.push_bind(value);
                if DATE_COLUMNS.contains(&i) {
                    row.push_unseparated("::date");
                }
            }
        });
        builder.build().execute(&mut *tx).await?;
    }
    tx.commit().await
}

async fn write_bulk_copy(
    pool: &PgPool,
    table: &TableName,
    records: &[Record],
) -> Result<(), sqlx::Error> {
    let payload = copy_payload(records).map_err(sqlx::Error::Io)?;
    let mut tx = pool.begin().await?;
    let mut copy = tx.copy_in_raw(&copy_sql(table)).await?;
    copy.send(payload).await?;
    let rows = copy.finish().await?;
    debug!("COPY into {} accepted {} rows", table, rows);
    tx.commit().await
}
