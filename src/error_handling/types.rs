//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout the application.

use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error building the TLS client configurations.
    #[error("TLS setup error: {0}")]
    TlsSetupError(String),
}

/// Error types for reading the input inventory.
///
/// All of these are process-fatal: without a readable input with the
/// required columns there is nothing to probe.
#[derive(Error, Debug)]
pub enum InputError {
    /// The input file could not be opened or parsed as CSV.
    #[error("Input read error for {}: {source}", path.display())]
    Read { path: PathBuf, source: csv::Error },

    /// The input file has no header row to map columns from.
    #[error("Input file {} has no header row", path.display())]
    MissingHeader { path: PathBuf },

    /// A required column is absent from the header.
    #[error("Input file {} is missing required column `{column}`", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Error types for the output writer.
#[derive(Error, Debug)]
pub enum OutputError {
    /// The output file could not be created.
    #[error("Output file creation error for {}: {source}", path.display())]
    Create { path: PathBuf, source: csv::Error },

    /// A row failed to serialize.
    #[error("Output write error: {0}")]
    Write(#[from] csv::Error),

    /// Buffered rows failed to reach the file.
    #[error("Output flush error: {0}")]
    Flush(#[from] std::io::Error),
}

/// Types of errors that can occur while probing a record.
///
/// This enum categorizes actual error conditions - failures that prevent a
/// connect, handshake, or certificate read from completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Connect-phase errors
    ConnectionRefused,
    ConnectTimeout,
    HostResolutionError,
    HostUnreachable,
    NetworkUnreachable,
    ConnectOtherError,
    // Records that never produced a connectable endpoint
    UnresolvableTarget,
    // TLS-phase errors
    TlsHandshakeError,
    TlsHandshakeTimeout,
    CertificateParseError,
    // Whole-record pipeline guard
    TargetTimeout,
}

/// Types of warnings that can occur while probing a record.
///
/// Warnings indicate degraded input or partial data that doesn't prevent the
/// record from reaching the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    EmptyRecordName,              // record_name column present but blank
    InvalidServerName,            // host string rejected as a TLS server name
    PartialCertificateMetadata,   // certificate obtained but some fields undecodable
}

/// Types of informational findings recorded while probing.
///
/// Findings are certificate verdicts worth surfacing in the run summary;
/// they are results, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    SelfSignedCertificate,
    UntrustedCertificate,
    CertificateExpired,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ConnectionRefused => "Connection refused",
            ErrorType::ConnectTimeout => "Connect timeout",
            ErrorType::HostResolutionError => "Host resolution error",
            ErrorType::HostUnreachable => "Host unreachable",
            ErrorType::NetworkUnreachable => "Network unreachable",
            ErrorType::ConnectOtherError => "Connect other error",
            ErrorType::UnresolvableTarget => "Unresolvable target",
            ErrorType::TlsHandshakeError => "TLS handshake error",
            ErrorType::TlsHandshakeTimeout => "TLS handshake timeout",
            ErrorType::CertificateParseError => "Certificate parse error",
            ErrorType::TargetTimeout => "Target processing timeout",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::EmptyRecordName => "Empty record name",
            WarningType::InvalidServerName => "Invalid TLS server name",
            WarningType::PartialCertificateMetadata => "Partial certificate metadata",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::SelfSignedCertificate => "Self-signed certificate",
            InfoType::UntrustedCertificate => "Untrusted certificate chain",
            InfoType::CertificateExpired => "Expired certificate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_error_type_as_str() {
        // Test a few error types to verify as_str() works
        assert_eq!(ErrorType::ConnectionRefused.as_str(), "Connection refused");
        assert_eq!(ErrorType::ConnectTimeout.as_str(), "Connect timeout");
        assert_eq!(
            ErrorType::UnresolvableTarget.as_str(),
            "Unresolvable target"
        );
        assert_eq!(
            ErrorType::TargetTimeout.as_str(),
            "Target processing timeout"
        );
    }

    #[test]
    fn test_warning_type_as_str() {
        assert_eq!(WarningType::EmptyRecordName.as_str(), "Empty record name");
        assert_eq!(
            WarningType::InvalidServerName.as_str(),
            "Invalid TLS server name"
        );
        assert_eq!(
            WarningType::PartialCertificateMetadata.as_str(),
            "Partial certificate metadata"
        );
    }

    #[test]
    fn test_info_type_as_str() {
        assert_eq!(
            InfoType::SelfSignedCertificate.as_str(),
            "Self-signed certificate"
        );
        assert_eq!(
            InfoType::UntrustedCertificate.as_str(),
            "Untrusted certificate chain"
        );
        assert_eq!(InfoType::CertificateExpired.as_str(), "Expired certificate");
    }

    #[test]
    fn test_all_error_types_have_string_representation() {
        // Verify all error types have non-empty string representations
        for error_type in ErrorType::iter() {
            let str_repr = error_type.as_str();
            assert!(
                !str_repr.is_empty(),
                "{:?} should have non-empty string",
                error_type
            );
        }
    }

    #[test]
    fn test_all_warning_types_have_string_representation() {
        // Verify all warning types have non-empty string representations
        for warning_type in WarningType::iter() {
            let str_repr = warning_type.as_str();
            assert!(
                !str_repr.is_empty(),
                "{:?} should have non-empty string",
                warning_type
            );
        }
    }

    #[test]
    fn test_all_info_types_have_string_representation() {
        // Verify all info types have non-empty string representations
        for info_type in InfoType::iter() {
            let str_repr = info_type.as_str();
            assert!(
                !str_repr.is_empty(),
                "{:?} should have non-empty string",
                info_type
            );
        }
    }

    #[test]
    fn test_error_type_equality() {
        // Verify ErrorType implements PartialEq correctly
        assert_eq!(ErrorType::ConnectTimeout, ErrorType::ConnectTimeout);
        assert_ne!(ErrorType::ConnectTimeout, ErrorType::ConnectionRefused);
    }

    #[test]
    fn test_input_error_messages_name_the_path() {
        let err = InputError::MissingColumn {
            path: PathBuf::from("records.csv"),
            column: "record_name",
        };
        let msg = err.to_string();
        assert!(msg.contains("records.csv"));
        assert!(msg.contains("record_name"));
    }
}
