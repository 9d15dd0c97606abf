//! PostgreSQL-backed tests. They return early when `DATABASE_URL` is unset.

mod helpers;

use std::sync::Arc;

use bulkload_bench::app::{run_bench, scenario_matrix, LoadMode};
use bulkload_bench::storage::{
    count_rows, create_indexes, insert_record, restore_session, truncate, PgBatchSink, TableName,
    MULTI_ROW_CHUNK, SESSION_TUNING,
};
use bulkload_bench::{load_streaming, parse_record, LoadError, WriteStrategy};
use helpers::{drop_table, pg_pool, scratch_table, valid_rows, write_csv};
use sqlx::{PgPool, Row};
use strum::IntoEnumIterator;
use tempfile::TempDir;

async fn table_contents(pool: &PgPool, table: &TableName) -> Vec<Vec<String>> {
    let rows = sqlx::query(&format!(
        "SELECT apellido, nombre, nro_documento, tipo_documento, fecha_nacimiento::text, \
         sexo, nro_legajo, fecha_ingreso::text FROM {table}"
    ))
    .fetch_all(pool)
    .await
    .expect("Failed to read table");

    let mut contents: Vec<Vec<String>> = rows
        .iter()
        .map(|row| (0..8).map(|i| row.get::<String, _>(i)).collect())
        .collect();
    contents.sort();
    contents
}

fn sink(pool: &PgPool, table: &TableName, strategy: WriteStrategy) -> Arc<PgBatchSink> {
    Arc::new(PgBatchSink::new(pool.clone(), table.clone(), strategy))
}

#[tokio::test]
async fn test_every_strategy_stores_the_same_rows() {
    let Some(pool) = pg_pool().await else { return };
    let table = scratch_table(&pool, "equiv").await;
    let dir = TempDir::new().expect("temp dir");
    let mut rows = valid_rows(40);
    rows.push("\"Perez, Juan\",\"O\"\"Brien\",1,DNI,1999-02-28,M,41,2019-08-01".to_string());
    rows.push("Bad,Date,1,DNI,1999-02-30,M,42,2019-08-01".to_string());
    let path = write_csv(&dir, "equiv.csv", &rows);

    let mut snapshots = Vec::new();
    for strategy in WriteStrategy::iter() {
        truncate(&pool, &table).await.expect("truncate");
        let report = load_streaming(&path, sink(&pool, &table, strategy), 6, 3)
            .await
            .unwrap_or_else(|e| panic!("{strategy} load failed: {e}"));
        assert_eq!(report.records_written, 41, "{strategy}");
        assert_eq!(count_rows(&pool, &table).await.expect("count"), 41);
        snapshots.push(table_contents(&pool, &table).await);
    }

    assert_eq!(snapshots[0], snapshots[1]);
    assert_eq!(snapshots[1], snapshots[2]);
    assert!(snapshots[0]
        .iter()
        .any(|row| row[0] == "Perez, Juan" && row[1] == "O\"Brien"));

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn test_rerun_without_truncate_doubles_rows() {
    let Some(pool) = pg_pool().await else { return };
    let table = scratch_table(&pool, "rerun").await;
    let dir = TempDir::new().expect("temp dir");
    let path = write_csv(&dir, "rerun.csv", &valid_rows(15));

    for _ in 0..2 {
        load_streaming(&path, sink(&pool, &table, WriteStrategy::BulkCopy), 4, 2)
            .await
            .expect("load succeeds");
    }
    assert_eq!(count_rows(&pool, &table).await.expect("count"), 30);

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn test_multi_row_splits_oversized_batches() {
    let Some(pool) = pg_pool().await else { return };
    let table = scratch_table(&pool, "chunked").await;
    let dir = TempDir::new().expect("temp dir");
    let total = MULTI_ROW_CHUNK + 9;
    let path = write_csv(&dir, "chunked.csv", &valid_rows(total));

    let report = load_streaming(&path, sink(&pool, &table, WriteStrategy::MultiRow), total, 1)
        .await
        .expect("oversized multi-row batch succeeds");
    assert_eq!(report.batches_written, 1);
    assert_eq!(count_rows(&pool, &table).await.expect("count"), total as i64);

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn test_missing_table_surfaces_write_error() {
    let Some(pool) = pg_pool().await else { return };
    let table = TableName::new("bulkload_bench_missing_table").expect("valid");
    drop_table(&pool, &table).await;
    let dir = TempDir::new().expect("temp dir");
    let path = write_csv(&dir, "missing.csv", &valid_rows(20));

    for strategy in WriteStrategy::iter() {
        match load_streaming(&path, sink(&pool, &table, strategy), 5, 2).await {
            Err(LoadError::Write(e)) => assert_eq!(e.strategy, strategy),
            other => panic!("{strategy}: expected write error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_insert_record_and_indexes() {
    let Some(pool) = pg_pool().await else { return };
    let table = scratch_table(&pool, "single").await;

    let record = parse_record(&[
        "Araya",
        "Valentino",
        "45361303",
        "DNI",
        "2004-07-14",
        "M",
        "9938",
        "2022-03-08",
    ])
    .expect("valid record");
    insert_record(&pool, &table, &record).await.expect("insert");

    let contents = table_contents(&pool, &table).await;
    assert_eq!(
        contents,
        vec![vec![
            "Araya", "Valentino", "45361303", "DNI", "2004-07-14", "M", "9938", "2022-03-08"
        ]]
    );
    let mut conn = pool.acquire().await.expect("connection");
    sqlx::query(SESSION_TUNING[0])
        .execute(&mut *conn)
        .await
        .expect("tuned");
    restore_session(&mut conn).await;
    assert_eq!(create_indexes(&mut conn, &table).await, 3);
    drop(conn);

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn test_session_tuning_can_be_restored() {
    let Some(pool) = pg_pool().await else { return };
    let mut conn = pool.acquire().await.expect("connection");

    sqlx::query(SESSION_TUNING[0])
        .execute(&mut *conn)
        .await
        .expect("synchronous_commit is user-settable");
    let tuned: String = sqlx::query_scalar("SHOW synchronous_commit")
        .fetch_one(&mut *conn)
        .await
        .expect("show");
    assert_eq!(tuned, "off");

    restore_session(&mut conn).await;
    let restored: String = sqlx::query_scalar("SHOW synchronous_commit")
        .fetch_one(&mut *conn)
        .await
        .expect("show");
    assert_eq!(restored, "on");
}

#[tokio::test]
async fn test_bench_matrix_truncates_between_scenarios() {
    let Some(pool) = pg_pool().await else { return };
    let table = scratch_table(&pool, "bench").await;
    let dir = TempDir::new().expect("temp dir");
    let path = write_csv(&dir, "bench.csv", &valid_rows(30));

    let scenarios = scenario_matrix(
        &[WriteStrategy::MultiStatement, WriteStrategy::BulkCopy],
        &[7],
        &[2],
        &LoadMode::selection(true, &[4]),
    );
    let results = run_bench(&pool, &table, &path, &scenarios).await;

    assert_eq!(results.len(), 6);
    for result in &results {
        assert!(result.succeeded(), "{:?}", result.error);
        assert_eq!(result.rows_in_table, 30);
    }

    drop_table(&pool, &table).await;
}
