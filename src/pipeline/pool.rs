//! Worker pool: a fixed set of writer tasks draining the batch queue.

use std::sync::Arc;

use log::{debug, error};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::DEFAULT_WORKERS;
use crate::error_handling::{LoadError, LoadStats, WriteError};

use super::batch::Batch;
use super::sink::BatchSink;

/// `W` writer tasks pulling batches from a shared bounded queue.
///
/// Each writer loops "pull, write, repeat" until the queue is closed and
/// drained. A writer that fails reports the error once and exits without
/// pulling more work; its siblings keep going. The pool is complete only
/// after every writer has returned.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    errors: mpsc::Receiver<WriteError>,
}

impl WorkerPool {
    /// Starts `workers` writer tasks (the default count if `workers` is 0).
    pub fn start(
        workers: usize,
        queue: async_channel::Receiver<Batch>,
        sink: Arc<dyn BatchSink>,
        stats: Arc<LoadStats>,
    ) -> Self {
        let workers = if workers == 0 { DEFAULT_WORKERS } else { workers };
        // One slot per writer: each reports at most once, so sends never block.
        let (error_tx, errors) = mpsc::channel(workers);

        let handles = (0..workers)
            .map(|worker_id| {
                let queue = queue.clone();
                let sink = Arc::clone(&sink);
                let stats = Arc::clone(&stats);
                let error_tx = error_tx.clone();
                tokio::spawn(async move {
                    run_writer(worker_id, queue, sink, error_tx, stats).await;
                })
            })
            .collect();

        debug!("Started {} writer tasks", workers);
        Self { handles, errors }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Error signal for the coordinator's handoff.
    pub fn errors(&mut self) -> &mut mpsc::Receiver<WriteError> {
        &mut self.errors
    }

    /// Waits for every writer to exit.
    ///
    /// Returns the first write error still waiting on the error channel, or
    /// [`LoadError::WorkerPanicked`] if a writer panicked.
    pub async fn join(mut self) -> Result<(), LoadError> {
        let mut panicked = None;
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Writer task failed to complete: {e}");
                panicked.get_or_insert_with(|| e.to_string());
            }
        }

        if let Ok(err) = self.errors.try_recv() {
            return Err(LoadError::Write(err));
        }
        match panicked {
            Some(msg) => Err(LoadError::WorkerPanicked(msg)),
            None => Ok(()),
        }
    }
}

async fn run_writer(
    worker_id: usize,
    queue: async_channel::Receiver<Batch>,
    sink: Arc<dyn BatchSink>,
    errors: mpsc::Sender<WriteError>,
    stats: Arc<LoadStats>,
) {
    debug!("Writer {} started", worker_id);

    while let Ok(batch) = queue.recv().await {
        let range = batch.range();
        match sink.write_batch(&batch).await {
            Ok(()) => {
                stats.record_batch_written(batch.len());
                debug!("Writer {} wrote {} to {}", worker_id, range, sink.name());
            }
            Err(e) => {
                error!("Writer {} stopping: {e}", worker_id);
                let _ = errors.try_send(e);
                break;
            }
        }
    }

    debug!("Writer {} exited", worker_id);
}
