//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions and categorization
//! - Processing statistics tracking (errors, warnings, info findings)
//! - Typed errors for initialization, input, and output failures
//!
//! Error types are categorized into:
//! - **Errors**: Failures that prevent a connect, handshake, or read
//! - **Warnings**: Degraded input or partial data
//! - **Info**: Certificate verdicts surfaced in the run summary

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::categorize_connect_error;
pub use stats::ProcessingStats;
pub use types::{
    ErrorType, InfoType, InitializationError, InputError, OutputError, WarningType,
};
