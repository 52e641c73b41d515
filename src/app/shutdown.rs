//! Graceful shutdown handling.

use tokio_util::sync::CancellationToken;

/// Shuts down the background progress logger gracefully.
///
/// Output flushing is not handled here: the CSV writer drains its channel
/// and flushes when the sender side is dropped.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: tokio::task::JoinHandle<()>,
) {
    // Signal logging task to stop and await it
    cancel.cancel();
    let _ = logging_task.await;
}
