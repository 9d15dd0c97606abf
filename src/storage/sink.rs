//! PostgreSQL batch sink.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error_handling::WriteError;
use crate::pipeline::{Batch, BatchSink};

use super::strategy::WriteStrategy;
use super::table::TableName;

/// Writes batches into one table with one technique through a shared pool.
#[derive(Clone)]
pub struct PgBatchSink {
    pool: PgPool,
    table: TableName,
    strategy: WriteStrategy,
}

impl PgBatchSink {
    pub fn new(pool: PgPool, table: TableName, strategy: WriteStrategy) -> Self {
        Self {
            pool,
            table,
            strategy,
        }
    }

    pub fn strategy(&self) -> WriteStrategy {
        self.strategy
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }
}

#[async_trait]
impl BatchSink for PgBatchSink {
    async fn write_batch(&self, batch: &Batch) -> Result<(), WriteError> {
        self.strategy
            .write(&self.pool, &self.table, batch.records())
            .await
            .map_err(|source| WriteError {
                strategy: self.strategy,
                range: batch.range(),
                source,
            })
    }

    fn name(&self) -> String {
        format!("{} ({})", self.table, self.strategy)
    }
}
