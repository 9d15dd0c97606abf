//! Streaming coordinator.
//!
//! Owns the batcher, the sending half of the batch queue and the worker pool,
//! and drives a run through its states:
//!
//! ```text
//! Idle -> Reading -> Draining -> Terminated
//!            \-----> Failed ---/
//! ```
//!
//! The first write failure observed while handing off a batch moves the run to
//! `Failed`: no further batches are accepted, the queue is closed and the
//! coordinator waits for every writer before surfacing that error. Batches
//! already queued are still written by healthy writers.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::config::LoadOptions;
use crate::error_handling::{LoadError, LoadStats};
use crate::record::Record;

use super::batch::{Batch, BatchRange, Batcher};
use super::handoff::{hand_off, Handoff};
use super::pool::WorkerPool;
use super::sink::BatchSink;

/// Lifecycle of one load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Reading,
    Draining,
    Failed,
    Terminated,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinatorState::Idle => "idle",
            CoordinatorState::Reading => "reading",
            CoordinatorState::Draining => "draining",
            CoordinatorState::Failed => "failed",
            CoordinatorState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

fn transition(state: &mut CoordinatorState, next: CoordinatorState) {
    debug!("Coordinator {} -> {}", state, next);
    *state = next;
}

/// Single reader side of a load run.
///
/// Feed records with [`push`](Self::push) and end the run with
/// [`finish`](Self::finish), which always waits for every writer.
pub struct Coordinator {
    state: CoordinatorState,
    batcher: Batcher,
    queue: async_channel::Sender<Batch>,
    pool: WorkerPool,
    failure: Option<LoadError>,
    abandoned: Option<BatchRange>,
}

impl Coordinator {
    /// Starts the worker pool against an empty queue and begins reading.
    pub fn start(sink: Arc<dyn BatchSink>, options: &LoadOptions, stats: Arc<LoadStats>) -> Self {
        let mut state = CoordinatorState::Idle;
        let (queue, receiver) = async_channel::bounded(options.queue_capacity());
        let pool = WorkerPool::start(options.effective_workers(), receiver, sink, stats);
        debug!(
            "Queue capacity {} for {} writers, batch size {}",
            options.queue_capacity(),
            pool.size(),
            options.batch_size
        );
        transition(&mut state, CoordinatorState::Reading);

        Self {
            state,
            batcher: Batcher::new(options.batch_size),
            queue,
            pool,
            failure: None,
            abandoned: None,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Adds one parsed record to the run.
    ///
    /// Returns `false` once the run has failed; the caller should stop reading.
    pub async fn push(&mut self, record: Record) -> bool {
        if self.state != CoordinatorState::Reading {
            return false;
        }
        if let Some(batch) = self.batcher.push(record) {
            self.dispatch(batch).await;
        }
        self.state == CoordinatorState::Reading
    }

    /// Ends the run: hands off the final partial batch, closes the queue and
    /// waits for every writer.
    ///
    /// # Errors
    ///
    /// Returns the first write failure (later ones are discarded), or
    /// [`LoadError::WorkerPanicked`] if a writer died without reporting.
    pub async fn finish(mut self) -> Result<(), LoadError> {
        if self.state == CoordinatorState::Reading {
            if let Some(batch) = self.batcher.finish() {
                self.dispatch(batch).await;
            }
        }
        if self.state == CoordinatorState::Reading {
            transition(&mut self.state, CoordinatorState::Draining);
        }

        // Receivers still get whatever was queued before the close.
        self.queue.close();
        let joined = self.pool.join().await;
        transition(&mut self.state, CoordinatorState::Terminated);

        if let Some(err) = self.failure {
            if let Err(later) = joined {
                debug!("Discarding later failure: {later}");
            }
            return Err(err);
        }
        match (joined, self.abandoned) {
            (Err(err), _) => Err(err),
            (Ok(()), Some(range)) => Err(LoadError::WorkerPanicked(format!(
                "every writer exited before {range} could be queued"
            ))),
            (Ok(()), None) => Ok(()),
        }
    }

    async fn dispatch(&mut self, batch: Batch) {
        let range = batch.range();
        match hand_off(&self.queue, batch, self.pool.errors()).await {
            Handoff::Delivered => debug!("Queued {}", range),
            Handoff::Interrupted(err) => {
                warn!("Abandoning {} after write failure: {err}", range);
                self.failure = Some(LoadError::Write(err));
                transition(&mut self.state, CoordinatorState::Failed);
            }
            Handoff::Closed(_) => {
                warn!("No writers left to take {}", range);
                self.abandoned = Some(range);
                transition(&mut self.state, CoordinatorState::Failed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::WriteError;
    use crate::record::parse_record;
    use crate::storage::WriteStrategy;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingSink {
        written: Mutex<Vec<String>>,
        fail_sequence: Option<u64>,
        delay: Duration,
    }

    impl RecordingSink {
        fn new(fail_sequence: Option<u64>, delay: Duration) -> Self {
            Self {
                written: Mutex::new(Vec::new()),
                fail_sequence,
                delay,
            }
        }
    }

    #[async_trait]
    impl BatchSink for RecordingSink {
        async fn write_batch(&self, batch: &Batch) -> Result<(), WriteError> {
            tokio::time::sleep(self.delay).await;
            let range = batch.range();
            if Some(range.sequence) == self.fail_sequence {
                return Err(WriteError {
                    strategy: WriteStrategy::MultiStatement,
                    range,
                    source: sqlx::Error::Protocol("injected failure".into()),
                });
            }
            let mut written = self.written.lock().unwrap();
            written.extend(batch.records().iter().map(|r| r.enrollment_number.clone()));
            Ok(())
        }

        fn name(&self) -> String {
            "recording".to_string()
        }
    }

    fn record(n: usize) -> Record {
        let legajo = n.to_string();
        parse_record(&[
            "Apellido",
            "Nombre",
            "30000000",
            "DNI",
            "1990-01-01",
            "F",
            legajo.as_str(),
            "2015-03-01",
        ])
        .expect("valid record")
    }

    #[tokio::test]
    async fn test_all_records_written_then_terminated() {
        let sink = Arc::new(RecordingSink::new(None, Duration::ZERO));
        let stats = Arc::new(LoadStats::new());
        let options = LoadOptions::new(3, 2);
        let mut coordinator = Coordinator::start(sink.clone(), &options, Arc::clone(&stats));
        assert_eq!(coordinator.state(), CoordinatorState::Reading);

        for n in 1..=10 {
            assert!(coordinator.push(record(n)).await);
        }
        coordinator.finish().await.expect("run succeeds");

        assert_eq!(sink.written.lock().unwrap().len(), 10);
        assert_eq!(stats.batches_written(), 4);
        assert_eq!(stats.records_written(), 10);
    }

    #[tokio::test]
    async fn test_no_records_is_success_with_no_batches() {
        let sink = Arc::new(RecordingSink::new(None, Duration::ZERO));
        let stats = Arc::new(LoadStats::new());
        let coordinator = Coordinator::start(sink, &LoadOptions::new(5, 3), Arc::clone(&stats));
        coordinator.finish().await.expect("empty run succeeds");
        assert_eq!(stats.batches_written(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_stops_reading_and_surfaces() {
        let sink = Arc::new(RecordingSink::new(Some(0), Duration::from_millis(5)));
        let options = LoadOptions {
            batch_size: 1,
            workers: 1,
            queue_depth_per_worker: 1,
        };
        let mut coordinator = Coordinator::start(sink, &options, Arc::new(LoadStats::new()));

        let mut accepted = 0;
        for n in 1..=1000 {
            if !coordinator.push(record(n)).await {
                break;
            }
            accepted += 1;
        }
        assert!(accepted < 1000, "reading should stop after the failure");
        assert_eq!(coordinator.state(), CoordinatorState::Failed);

        match coordinator.finish().await {
            Err(LoadError::Write(e)) => assert_eq!(e.range.sequence, 0),
            other => panic!("expected write error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_in_final_batch_fails_run() {
        // Fails while draining: the last (partial) batch is the bad one.
        let sink = Arc::new(RecordingSink::new(Some(2), Duration::ZERO));
        let mut coordinator =
            Coordinator::start(sink, &LoadOptions::new(4, 2), Arc::new(LoadStats::new()));
        for n in 1..=9 {
            coordinator.push(record(n)).await;
        }

        match coordinator.finish().await {
            Err(LoadError::Write(e)) => {
                assert_eq!(e.range.sequence, 2);
                assert_eq!((e.range.first, e.range.last), (9, 9));
            }
            other => panic!("expected write error, got {:?}", other),
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(CoordinatorState::Draining.to_string(), "draining");
        assert_eq!(CoordinatorState::Terminated.to_string(), "terminated");
    }
}
