//! record_prober library: network reachability and certificate trust probing
//!
//! This library provides high-level APIs for probing DNS record inventories:
//! TCP reachability on ports 80 and 443, TLS certificate metadata extraction,
//! chain trust validation, and self-signed classification, written back as an
//! enriched copy of the input CSV.
//!
//! # Example
//!
//! ```no_run
//! use record_prober::{Config, run_probe};
//! use tokio;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     input_file: std::path::PathBuf::from("records.csv"),
//!     workers: 20,
//!     ..Default::default()
//! };
//!
//! let report = run_probe(config).await?;
//! println!("Probed {} records: {} reachable, {} unreachable",
//!          report.total_records, report.reachable, report.unreachable);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context. TLS probing also needs a process-wide rustls crypto provider;
//! call [`initialization::init_crypto_provider`] once at startup.

#![warn(missing_docs)]

mod app;
pub mod config;
mod error_handling;
pub mod export;
pub mod initialization;
mod input;
mod models;
mod probe;
mod resolve;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use run::{run_probe, ProbeReport};

// Internal run module (contains the main probing logic)
mod run {
    use anyhow::{ensure, Context, Result};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::stream::FuturesUnordered;
    use futures::StreamExt;
    use log::{info, warn};
    use tokio_util::sync::CancellationToken;

    use crate::app::statistics::print_error_statistics;
    use crate::app::{log_progress, print_timing_statistics, shutdown_gracefully};
    use crate::config::{Config, LOGGING_INTERVAL, MAX_TIMEOUT_SECS};
    use crate::error_handling::{ErrorType, ProcessingStats};
    use crate::export::{default_output_path, start_csv_writer};
    use crate::initialization::{init_semaphore, init_tls_connectors};
    use crate::input::read_input;
    use crate::probe::{process_target, timed_out_record, ProbeContext};
    use crate::resolve::resolve_target;
    use crate::utils::TimingStats;

    /// Results of a probing run.
    ///
    /// Contains summary statistics and metadata about the completed run.
    #[derive(Debug, Clone)]
    pub struct ProbeReport {
        /// Total number of input records probed
        pub total_records: usize,
        /// Number of records with at least one port accepting connections
        pub reachable: usize,
        /// Number of records with neither port accepting connections
        pub unreachable: usize,
        /// Path to the CSV file containing results
        pub output_path: PathBuf,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs a probe over every record in the input file.
    ///
    /// This is the main entry point for the library. It reads the record
    /// inventory, probes records concurrently, and streams enriched rows to
    /// the output CSV as they complete. Output row order therefore follows
    /// completion, not input order.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration for the run (input path, concurrency, timeouts, etc.)
    ///
    /// # Returns
    ///
    /// Returns a `ProbeReport` containing summary statistics, or an error if
    /// the run failed to complete.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The configuration is invalid (non-positive or oversized timeout,
    ///   zero workers)
    /// - The input file cannot be read or lacks the required columns
    /// - The output file cannot be created or written
    /// - TLS resources cannot be initialized
    ///
    /// # Example
    ///
    /// ```no_run
    /// use record_prober::{Config, run_probe};
    /// use std::path::PathBuf;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config {
    ///     input_file: PathBuf::from("records.csv"),
    ///     ..Default::default()
    /// };
    /// let report = run_probe(config).await?;
    /// println!("Probed {} records", report.total_records);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_probe(config: Config) -> Result<ProbeReport> {
        ensure!(
            config.timeout.is_finite() && config.timeout > 0.0,
            "timeout must be a positive number of seconds (got {})",
            config.timeout
        );
        ensure!(
            config.timeout <= MAX_TIMEOUT_SECS,
            "timeout must be at most {} seconds (got {})",
            MAX_TIMEOUT_SECS,
            config.timeout
        );
        ensure!(config.workers > 0, "worker count must be at least 1");
        let connect_timeout = config.connect_timeout();
        let target_timeout = config.target_timeout();

        let (headers, records) =
            read_input(&config.input_file).context("Failed to read input file")?;
        let total_records = records.len();

        let output_path = config
            .output_file
            .clone()
            .unwrap_or_else(|| default_output_path(&config.input_file));
        let (record_tx, writer_handle) =
            start_csv_writer(&output_path, &headers).context("Failed to create output file")?;
        info!("Writing results to {}", output_path.display());

        let semaphore = init_semaphore(config.workers);
        let (inspect_connector, validate_connector) =
            init_tls_connectors().context("Failed to initialize TLS connectors")?;

        let stats = Arc::new(ProcessingStats::new());
        let timing_stats = Arc::new(TimingStats::new());

        let shared_ctx = Arc::new(ProbeContext {
            inspect_connector,
            validate_connector,
            stats: Arc::clone(&stats),
            timing: Arc::clone(&timing_stats),
            connect_timeout,
        });

        let start_time = std::time::Instant::now();

        let processed_records = Arc::new(AtomicUsize::new(0));
        let unreachable_records = Arc::new(AtomicUsize::new(0));
        let total_submitted = Arc::new(AtomicUsize::new(0));

        // The progress logger starts before submission: with every permit
        // taken, most of a large run elapses inside the submission loop
        let cancel = CancellationToken::new();
        let cancel_logging = cancel.child_token();
        let processed_for_logging = Arc::clone(&processed_records);
        let unreachable_for_logging = Arc::clone(&unreachable_records);
        let total_for_logging = Arc::clone(&total_submitted);
        let logging_task = tokio::task::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(LOGGING_INTERVAL as u64));
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        log_progress(start_time, &processed_for_logging, &unreachable_for_logging, Some(&total_for_logging));
                    }
                    _ = cancel_logging.cancelled() => {
                        break;
                    }
                }
            }
        });

        let mut tasks = FuturesUnordered::new();

        for record in records {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("Semaphore closed, skipping record: {}", record.record_name);
                    continue;
                }
            };

            total_submitted.fetch_add(1, Ordering::SeqCst);

            let ctx = Arc::clone(&shared_ctx);
            let processed_clone = Arc::clone(&processed_records);
            let unreachable_clone = Arc::clone(&unreachable_records);
            let tx = record_tx.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = permit;

                let target = resolve_target(record);
                let fallback = target.record.clone();

                let probed = match tokio::time::timeout(
                    target_timeout,
                    process_target(target, Arc::clone(&ctx)),
                )
                .await
                {
                    Ok(probed) => probed,
                    Err(_) => {
                        warn!("Timeout probing record {}", fallback.record_name);
                        ctx.stats.increment_error(ErrorType::TargetTimeout);
                        timed_out_record(fallback, target_timeout)
                    }
                };

                if !probed.outcome.reachable() {
                    unreachable_clone.fetch_add(1, Ordering::SeqCst);
                }
                if tx.send(probed).is_err() {
                    warn!("Output writer is gone; dropping result");
                }
                processed_clone.fetch_add(1, Ordering::SeqCst);
            }));
        }

        drop(record_tx);

        while let Some(task_result) = tasks.next().await {
            if let Err(join_error) = task_result {
                processed_records.fetch_add(1, Ordering::SeqCst);
                unreachable_records.fetch_add(1, Ordering::SeqCst);
                warn!("Task panicked: {:?}", join_error);
            }
        }

        let written = writer_handle
            .await
            .context("Output writer task failed")?
            .context("Failed to write output file")?;
        if written != total_records {
            warn!(
                "Wrote {} rows for {} input records",
                written, total_records
            );
        }

        shutdown_gracefully(cancel, logging_task).await;

        log_progress(
            start_time,
            &processed_records,
            &unreachable_records,
            Some(&total_submitted),
        );

        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        let processed = processed_records.load(Ordering::SeqCst);
        let unreachable = unreachable_records.load(Ordering::SeqCst);

        print_error_statistics(&stats);

        if config.show_timing {
            print_timing_statistics(&timing_stats);
        }

        Ok(ProbeReport {
            total_records,
            reachable: processed.saturating_sub(unreachable),
            unreachable,
            output_path,
            elapsed_seconds,
        })
    }
}
