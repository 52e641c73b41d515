//! Progress logging utilities.

use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Logs progress information about record processing.
///
/// # Arguments
///
/// * `start_time` - The start time of processing
/// * `processed` - Atomic counter of records probed so far
/// * `unreachable` - Atomic counter of records with neither port open
/// * `total` - Atomic counter of records submitted, when known
pub fn log_progress(
    start_time: std::time::Instant,
    processed: &Arc<AtomicUsize>,
    unreachable: &Arc<AtomicUsize>,
    total: Option<&Arc<AtomicUsize>>,
) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let processed_count = processed.load(Ordering::SeqCst);
    let unreachable_count = unreachable.load(Ordering::SeqCst);
    let rate = if elapsed_secs > 0.0 {
        processed_count as f64 / elapsed_secs
    } else {
        0.0
    };
    match total {
        Some(total) => {
            info!(
                "Processed {}/{} records ({} unreachable) in {:.2} seconds (~{:.2} records/sec)",
                processed_count,
                total.load(Ordering::SeqCst),
                unreachable_count,
                elapsed_secs,
                rate
            );
        }
        None => {
            info!(
                "Processed {} records ({} unreachable) in {:.2} seconds (~{:.2} records/sec)",
                processed_count, unreachable_count, elapsed_secs, rate
            );
        }
    }
}
