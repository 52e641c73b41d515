//! Configuration constants.
//!
//! This module defines configuration constants used throughout the application,
//! including timeouts, default pool sizing, and output layout parameters.

// constants (used as defaults)
/// Default per-connection timeout in seconds (TCP connect and TLS handshake)
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;
/// Default number of concurrent probe workers (semaphore limit)
pub const DEFAULT_WORKER_COUNT: usize = 10;
/// Progress logging interval in seconds
pub const LOGGING_INTERVAL: usize = 5;

// Per-target processing guard
/// Factor applied to the connection timeout to bound a whole target.
/// One target performs at most: TCP connect on 80, TCP connect on 443,
/// two TLS sessions (connect + handshake each). That is six timed network
/// operations; 8x the per-connection timeout leaves headroom for scheduling.
pub const TARGET_TIMEOUT_FACTOR: u32 = 8;
/// Largest accepted per-connection timeout in seconds. Keeps the derived
/// durations (including the per-target guard) inside `Duration` range.
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;

// Probed ports
/// Plain HTTP reachability port
pub const PORT_HTTP: u16 = 80;
/// TLS reachability and certificate inspection port
pub const PORT_HTTPS: u16 = 443;

// Output layout
/// Suffix inserted before the extension of the input path when no output
/// path is given (`records.csv` -> `records_accessibility.csv`)
pub const OUTPUT_SUFFIX: &str = "_accessibility";
/// How often the output writer flushes buffered rows to disk, in seconds
pub const WRITER_FLUSH_INTERVAL_SECS: u64 = 5;
