//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_WORKER_COUNT, MAX_TIMEOUT_SECS, TARGET_TIMEOUT_FACTOR,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options and configuration.
///
/// This struct is automatically generated by `clap` from the field attributes.
/// All options except the input file have defaults and can be overridden via
/// command-line flags. It can also be constructed programmatically when the
/// crate is used as a library.
///
/// # Examples
///
/// ```no_run
/// use record_prober::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     input_file: PathBuf::from("records.csv"),
///     workers: 25,
///     timeout: 2.5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "record_prober",
    about = "Probes DNS records for port 80/443 reachability and certificate trust."
)]
pub struct Config {
    /// CSV file of DNS records to probe (record_type, record_name, record_value)
    #[arg(value_parser)]
    pub input_file: PathBuf,

    /// Output CSV path (default: input path with an `_accessibility` suffix)
    #[arg(short, long, value_parser)]
    pub output_file: Option<PathBuf>,

    /// Per-connection timeout in seconds (TCP connect and TLS handshake)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = parse_timeout)]
    pub timeout: f64,

    /// Number of concurrent probe workers
    #[arg(short, long, default_value_t = DEFAULT_WORKER_COUNT, value_parser = parse_workers)]
    pub workers: usize,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show detailed timing metrics at the end of the run
    #[arg(long, default_value_t = false)]
    pub show_timing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("records.csv"),
            output_file: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            workers: DEFAULT_WORKER_COUNT,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            show_timing: false,
        }
    }
}

impl Config {
    /// Timeout applied to each TCP connect and each TLS handshake.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }

    /// Upper bound on the processing time of a single record.
    ///
    /// A stuck target must not hold a worker slot forever; the whole
    /// per-record pipeline is wrapped in this timeout.
    pub fn target_timeout(&self) -> Duration {
        self.connect_timeout() * TARGET_TIMEOUT_FACTOR
    }
}

/// Parses and validates the `--timeout` value.
///
/// The value feeds `Duration::from_secs_f64` and the `target_timeout`
/// multiplication, which panic on negative, NaN, infinite or oversized
/// input, so all of those are rejected here.
fn parse_timeout(s: &str) -> Result<f64, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got `{s}`"));
    }
    if secs > MAX_TIMEOUT_SECS {
        return Err(format!(
            "timeout must be at most {MAX_TIMEOUT_SECS} seconds, got `{s}`"
        ));
    }
    Ok(secs)
}

/// Parses and validates the `--workers` value.
///
/// A zero-permit pool would leave the submission loop waiting forever on
/// its first permit, so zero is rejected.
fn parse_workers(s: &str) -> Result<usize, String> {
    let workers: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a worker count"))?;
    if workers == 0 {
        return Err("worker count must be at least 1".to_string());
    }
    Ok(workers)
}
