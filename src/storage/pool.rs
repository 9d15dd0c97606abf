//! Database connection pool management.
//!
//! This module initializes the PostgreSQL connection pool with:
//! - Connection limits and acquire timeout
//! - Optional bulk-load session tuning on every new connection

use log::{error, info, warn};
use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::PgPool;

use crate::config::{DbConfig, DB_ACQUIRE_TIMEOUT, DB_MAX_CONNECTIONS, DB_MIN_CONNECTIONS};
use crate::error_handling::DatabaseError;

/// Session settings that trade durability for write throughput.
pub const SESSION_TUNING: [&str; 2] = [
    "SET synchronous_commit = off",
    "SET session_replication_role = replica",
];

/// Statements that undo [`SESSION_TUNING`].
pub const SESSION_RESTORE: [&str; 2] = [
    "SET synchronous_commit = on",
    "SET session_replication_role = DEFAULT",
];

/// Initializes and returns a PostgreSQL connection pool.
///
/// With `tune_session`, every connection the pool opens first runs
/// [`SESSION_TUNING`]. A setting the server refuses (for example
/// `session_replication_role` without superuser rights) is logged and skipped.
pub async fn init_db_pool(config: &DbConfig, tune_session: bool) -> Result<PgPool, DatabaseError> {
    let connect_options = config.connect_options()?;

    let mut pool_options = PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .min_connections(DB_MIN_CONNECTIONS)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT);

    if tune_session {
        pool_options = pool_options.after_connect(|conn, _meta| {
            Box::pin(async move {
                apply_statements(conn, &SESSION_TUNING).await;
                Ok(())
            })
        });
    }

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            error!("Failed to connect to database {config}: {e}");
            DatabaseError::SqlError(e)
        })?;

    info!(
        "Connected to {config} (max {} connections, session tuning {})",
        DB_MAX_CONNECTIONS,
        if tune_session { "on" } else { "off" }
    );
    Ok(pool)
}

/// Puts one connection's session settings back to server defaults.
pub async fn restore_session(conn: &mut PgConnection) {
    apply_statements(conn, &SESSION_RESTORE).await;
}

async fn apply_statements(conn: &mut PgConnection, statements: &[&str]) {
    for statement in statements {
        if let Err(e) = sqlx::query(statement).execute(&mut *conn).await {
            warn!("Ignoring failed session setting '{statement}': {e}");
        }
    }
}
