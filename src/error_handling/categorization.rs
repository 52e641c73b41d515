//! Error categorization.
//!
//! This module maps low-level connect failures to stats counters and to the
//! stable error strings that end up in the output records.

use std::io;
use std::time::Duration;

use super::types::ErrorType;

/// Categorizes an `io::Error` from a TCP connect attempt.
///
/// Returns the `ErrorType` counter to bump and the error string recorded on
/// the port result. The strings are part of the output contract: operators
/// grep and pivot on them, so each failure class keeps a distinct, stable
/// phrasing and the text is never truncated or rewritten downstream.
///
/// Name resolution happens inside `TcpStream::connect` and surfaces as an
/// uncategorized `io::Error`, so it is recognized by message rather than by
/// `ErrorKind`.
pub fn categorize_connect_error(error: &io::Error, timeout: Duration) -> (ErrorType, String) {
    match error.kind() {
        io::ErrorKind::ConnectionRefused => {
            (ErrorType::ConnectionRefused, "connection refused".to_string())
        }
        io::ErrorKind::TimedOut => (
            ErrorType::ConnectTimeout,
            format!("connection timed out after {:.1}s", timeout.as_secs_f64()),
        ),
        io::ErrorKind::HostUnreachable => {
            (ErrorType::HostUnreachable, "host unreachable".to_string())
        }
        io::ErrorKind::NetworkUnreachable => {
            (ErrorType::NetworkUnreachable, "network unreachable".to_string())
        }
        _ => {
            let text = error.to_string();
            if text.contains("failed to lookup address")
                || text.contains("Name or service not known")
                || text.contains("nodename nor servname")
            {
                (
                    ErrorType::HostResolutionError,
                    format!("hostname resolution failed: {text}"),
                )
            } else {
                (ErrorType::ConnectOtherError, format!("connect failed: {text}"))
            }
        }
    }
}
