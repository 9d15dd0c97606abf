//! Target table maintenance: create, truncate, count, index.

use log::{info, warn};
use sqlx::postgres::PgConnection;
use sqlx::PgPool;

use crate::error_handling::DatabaseError;

use super::table::TableName;

/// Columns indexed after a load.
const INDEXED_COLUMNS: [&str; 3] = ["nro_legajo", "apellido", "fecha_ingreso"];

pub fn create_table_sql(table: &TableName) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         id BIGSERIAL PRIMARY KEY, \
         apellido TEXT NOT NULL, \
         nombre TEXT NOT NULL, \
         nro_documento TEXT NOT NULL, \
         tipo_documento TEXT NOT NULL, \
         fecha_nacimiento DATE NOT NULL, \
         sexo TEXT NOT NULL, \
         nro_legajo TEXT NOT NULL, \
         fecha_ingreso DATE NOT NULL)"
    )
}

pub fn index_sql(table: &TableName) -> Vec<String> {
    INDEXED_COLUMNS
        .iter()
        .map(|column| {
            format!("CREATE INDEX CONCURRENTLY IF NOT EXISTS idx_{table}_{column} ON {table} ({column})")
        })
        .collect()
}

/// Creates the target table if it does not exist.
pub async fn create_table(pool: &PgPool, table: &TableName) -> Result<(), DatabaseError> {
    sqlx::query(&create_table_sql(table)).execute(pool).await?;
    info!("Table {} is ready", table);
    Ok(())
}

pub async fn truncate(pool: &PgPool, table: &TableName) -> Result<(), DatabaseError> {
    sqlx::query(&format!("TRUNCATE TABLE {table}"))
        .execute(pool)
        .await?;
    info!("Truncated {}", table);
    Ok(())
}

pub async fn count_rows(pool: &PgPool, table: &TableName) -> Result<i64, DatabaseError> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Builds the secondary indexes used by lookups after a load.
///
/// Runs on the given connection so callers control its session settings. An
/// index that fails to build is logged and skipped. Returns how many were
/// created (or already existed).
pub async fn create_indexes(conn: &mut PgConnection, table: &TableName) -> usize {
    let mut created = 0;
    for statement in index_sql(table) {
        match sqlx::query(&statement).execute(&mut *conn).await {
            Ok(_) => created += 1,
            Err(e) => warn!("Failed to create index on {table}: {e}"),
        }
    }
    info!("{} of {} indexes on {} ready", created, INDEXED_COLUMNS.len(), table);
    created
}
