//! Background task shutdown.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels the progress logger and waits for it to exit.
pub async fn stop_progress_logger(cancel: CancellationToken, logging_task: Option<JoinHandle<()>>) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        if let Err(e) = logging_task.await {
            log::warn!("Progress logger ended abnormally: {e}");
        }
    }
}
