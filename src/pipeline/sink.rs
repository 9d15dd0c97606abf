//! Destination for batches.

use async_trait::async_trait;

use crate::error_handling::WriteError;

use super::batch::Batch;

/// Something that can durably persist one batch.
///
/// Implementations must be safe to call from many writer tasks at once; each
/// call receives a batch no other task can see.
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Persists every record of `batch`, in order, or fails as a whole.
    async fn write_batch(&self, batch: &Batch) -> Result<(), WriteError>;

    /// Short label used in log lines.
    fn name(&self) -> String;
}
