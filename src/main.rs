//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `record_prober` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use record_prober::initialization::{init_crypto_provider, init_logger_with};
use record_prober::{run_probe, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    // Run the probe using the library
    match run_probe(config).await {
        Ok(report) => {
            // Print user-friendly summary
            println!(
                "✅ Probed {} record{} ({} reachable, {} unreachable) in {:.1}s",
                report.total_records,
                if report.total_records == 1 { "" } else { "s" },
                report.reachable,
                report.unreachable,
                report.elapsed_seconds
            );
            println!("Results saved in {}", report.output_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("record_prober error: {:#}", e);
            process::exit(1);
        }
    }
}
