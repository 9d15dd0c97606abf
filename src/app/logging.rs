//! Progress logging utilities.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error_handling::LoadStats;

/// Logs how many records have been written so far and the running rate.
pub fn log_progress(start_time: Instant, stats: &LoadStats) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let written = stats.records_written();
    let rate = if elapsed_secs > 0.0 {
        written as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Wrote {} records ({} read, {} skipped) in {:.2} seconds (~{:.0} records/sec)",
        written,
        stats.rows_read(),
        stats.total_skipped(),
        elapsed_secs,
        rate
    );
}

/// Spawns a task that calls [`log_progress`] every `interval` until `cancel`
/// fires.
pub fn spawn_progress_logger(
    stats: Arc<LoadStats>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let start_time = Instant::now();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; nothing has been written yet.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => log_progress(start_time, &stats),
                _ = cancel.cancelled() => break,
            }
        }
    })
}
