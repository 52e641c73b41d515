//! Timing metrics for performance analysis.
//!
//! This module provides timing instrumentation to identify bottlenecks in the
//! probe pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Timing metrics for a single probed target.
///
/// All times are stored in microseconds for precision, then converted to
/// milliseconds only when displaying to users.
#[derive(Debug, Clone, Default)]
pub struct TargetTimingMetrics {
    /// TCP connect time against port 80 in microseconds
    pub connect_80_us: u64,
    /// TCP connect time against port 443 in microseconds
    pub connect_443_us: u64,
    /// Certificate inspection session time in microseconds
    pub tls_inspect_us: u64,
    /// Chain validation session time in microseconds
    pub trust_validate_us: u64,
    /// Total processing time (from start to finish) in microseconds
    pub total_us: u64,
}

/// Aggregated timing statistics across all probed targets.
#[derive(Debug, Default)]
pub struct TimingStats {
    /// Total number of targets timed
    pub count: Arc<AtomicU64>,
    /// Sum of port 80 connect times in microseconds
    pub connect_80_sum_us: Arc<AtomicU64>,
    /// Sum of port 443 connect times in microseconds
    pub connect_443_sum_us: Arc<AtomicU64>,
    /// Sum of inspection session times in microseconds
    pub tls_inspect_sum_us: Arc<AtomicU64>,
    /// Sum of validation session times in microseconds
    pub trust_validate_sum_us: Arc<AtomicU64>,
    /// Sum of total processing times in microseconds
    pub total_sum_us: Arc<AtomicU64>,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records timing metrics for a single target.
    pub fn record(&self, metrics: &TargetTimingMetrics) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.connect_80_sum_us
            .fetch_add(metrics.connect_80_us, Ordering::Relaxed);
        self.connect_443_sum_us
            .fetch_add(metrics.connect_443_us, Ordering::Relaxed);
        self.tls_inspect_sum_us
            .fetch_add(metrics.tls_inspect_us, Ordering::Relaxed);
        self.trust_validate_sum_us
            .fetch_add(metrics.trust_validate_us, Ordering::Relaxed);
        self.total_sum_us
            .fetch_add(metrics.total_us, Ordering::Relaxed);
    }

    /// Calculates and returns average times per target (in microseconds).
    pub fn averages(&self) -> TargetTimingMetrics {
        let count = self.count.load(Ordering::Relaxed);
        if count == 0 {
            return TargetTimingMetrics::default();
        }

        TargetTimingMetrics {
            connect_80_us: self.connect_80_sum_us.load(Ordering::Relaxed) / count,
            connect_443_us: self.connect_443_sum_us.load(Ordering::Relaxed) / count,
            tls_inspect_us: self.tls_inspect_sum_us.load(Ordering::Relaxed) / count,
            trust_validate_us: self.trust_validate_sum_us.load(Ordering::Relaxed) / count,
            total_us: self.total_sum_us.load(Ordering::Relaxed) / count,
        }
    }

    /// Converts microseconds to milliseconds for display (rounds to nearest).
    fn micros_to_ms(micros: u64) -> u64 {
        (micros + 500) / 1000
    }

    /// Formats a timing value, showing microseconds if the average rounds to
    /// 0ms but the total is non-zero.
    fn format_timing_with_micros(
        sum_micros: u64,
        avg_ms: u64,
        name: &str,
        percentage: f64,
    ) -> String {
        if avg_ms == 0 && sum_micros > 0 {
            format!(
                "  {:20} {:>6} ms ({:.1}%) (< 1ms avg, {}μs total)",
                name, avg_ms, percentage, sum_micros
            )
        } else {
            format!("  {:20} {:>6} ms ({:.1}%)", name, avg_ms, percentage)
        }
    }

    /// Logs a summary of timing statistics.
    pub fn log_summary(&self) {
        let count = self.count.load(Ordering::Relaxed);
        if count == 0 {
            log::info!("No timing data collected");
            return;
        }

        let avg = self.averages();
        let total_sum_micros = self.total_sum_us.load(Ordering::Relaxed);

        let avg_ms = TargetTimingMetrics {
            connect_80_us: Self::micros_to_ms(avg.connect_80_us),
            connect_443_us: Self::micros_to_ms(avg.connect_443_us),
            tls_inspect_us: Self::micros_to_ms(avg.tls_inspect_us),
            trust_validate_us: Self::micros_to_ms(avg.trust_validate_us),
            total_us: Self::micros_to_ms(avg.total_us),
        };
        let total_sum_ms = Self::micros_to_ms(total_sum_micros);

        log::info!("=== Timing Metrics Summary ({} targets) ===", count);
        log::info!("Average times per target:");
        let percentage = |part: u64, total: u64| -> f64 {
            if total == 0 {
                0.0
            } else {
                part as f64 / total as f64 * 100.0
            }
        };

        log::info!(
            "{}",
            Self::format_timing_with_micros(
                self.connect_80_sum_us.load(Ordering::Relaxed),
                avg_ms.connect_80_us,
                "TCP Connect :80:",
                percentage(avg_ms.connect_80_us, avg_ms.total_us),
            )
        );
        log::info!(
            "{}",
            Self::format_timing_with_micros(
                self.connect_443_sum_us.load(Ordering::Relaxed),
                avg_ms.connect_443_us,
                "TCP Connect :443:",
                percentage(avg_ms.connect_443_us, avg_ms.total_us),
            )
        );
        log::info!(
            "{}",
            Self::format_timing_with_micros(
                self.tls_inspect_sum_us.load(Ordering::Relaxed),
                avg_ms.tls_inspect_us,
                "TLS Inspect:",
                percentage(avg_ms.tls_inspect_us, avg_ms.total_us),
            )
        );
        log::info!(
            "{}",
            Self::format_timing_with_micros(
                self.trust_validate_sum_us.load(Ordering::Relaxed),
                avg_ms.trust_validate_us,
                "Trust Validate:",
                percentage(avg_ms.trust_validate_us, avg_ms.total_us),
            )
        );

        let other_ms = avg_ms.total_us.saturating_sub(
            avg_ms.connect_80_us
                + avg_ms.connect_443_us
                + avg_ms.tls_inspect_us
                + avg_ms.trust_validate_us,
        );
        log::info!(
            "  Other/Overhead:      {:>6} ms ({:.1}%)",
            other_ms,
            percentage(other_ms, avg_ms.total_us)
        );
        log::info!("  Total:               {:>6} ms", avg_ms.total_us);
        log::info!(
            "Total time across all targets: {} ms ({:.2} seconds)",
            total_sum_ms,
            total_sum_micros as f64 / 1_000_000.0
        );
    }
}

/// Converts a Duration to the microseconds stored in the timing counters.
pub fn duration_to_us(duration: Duration) -> u64 {
    duration.as_micros() as u64
}
