//! PostgreSQL storage: pool setup, write techniques and table maintenance.

mod insert;
mod pool;
mod schema;
mod sink;
mod strategy;
mod table;

pub use insert::insert_record;
pub use pool::{init_db_pool, restore_session, SESSION_RESTORE, SESSION_TUNING};
pub use schema::{count_rows, create_indexes, create_table, truncate};
pub use sink::PgBatchSink;
pub use strategy::{copy_payload, copy_sql, insert_sql, WriteStrategy, MULTI_ROW_CHUNK};
pub use table::TableName;
