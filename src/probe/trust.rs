//! Certificate chain trust validation.
//!
//! A second TLS session, this time with the chain-only verifier, decides
//! whether the peer's chain anchors in the webpki roots. Chain failures map
//! onto the OpenSSL verify-code numbering so downstream tooling keyed on
//! those codes keeps working.

use std::io;
use std::time::Duration;

use log::debug;
use rustls::pki_types::ServerName;
use rustls::CertificateError;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::error_handling::{
    categorize_connect_error, ErrorType, InfoType, ProcessingStats,
};
use crate::models::{TrustResult, TrustStatus};

/// OpenSSL verify codes whose presence marks the certificate as self-signed.
///
/// 18 is the self-signed leaf itself, 19 a self-signed anchor elsewhere in
/// the chain, 20 and 21 an issuer that could not be located or checked.
pub const SELF_SIGNED_VERIFY_CODES: [i32; 4] = [18, 19, 20, 21];

/// Decides the self-signed flag for a record.
///
/// An upstream flag from the input wins outright, even when it says `false`.
/// Otherwise a verify code in [`SELF_SIGNED_VERIFY_CODES`] marks the record,
/// and failing that, a "self signed" substring in the verify error does. A
/// verify code outside the set does not block the substring check.
pub fn classify_self_signed(
    upstream_flag: Option<bool>,
    verify_code: Option<i32>,
    verify_error: Option<&str>,
) -> bool {
    if let Some(flag) = upstream_flag {
        return flag;
    }
    if verify_code.is_some_and(|code| SELF_SIGNED_VERIFY_CODES.contains(&code)) {
        return true;
    }
    verify_error.is_some_and(|text| text.to_lowercase().contains("self signed"))
}

/// Maps a rustls certificate error onto an OpenSSL verify code and message.
///
/// rustls reports a self-signed leaf as an unknown issuer, so that case is
/// split on whether the inspected leaf was self-issued: code 18 when it was,
/// code 20 otherwise.
pub fn map_certificate_error(error: &CertificateError, self_issued_leaf: bool) -> (i32, String) {
    match error {
        CertificateError::Expired | CertificateError::ExpiredContext { .. } => {
            (10, "certificate has expired".to_string())
        }
        CertificateError::NotValidYet | CertificateError::NotValidYetContext { .. } => {
            (9, "certificate is not yet valid".to_string())
        }
        CertificateError::UnknownIssuer if self_issued_leaf => {
            (18, "self signed certificate".to_string())
        }
        CertificateError::UnknownIssuer => {
            (20, "unable to get local issuer certificate".to_string())
        }
        CertificateError::BadSignature => {
            (21, "unable to verify the first certificate".to_string())
        }
        CertificateError::Revoked => (23, "certificate revoked".to_string()),
        CertificateError::InvalidPurpose | CertificateError::InvalidPurposeContext { .. } => {
            (26, "unsupported certificate purpose".to_string())
        }
        other => (21, format!("certificate verify failed: {other:?}")),
    }
}

/// Trust result for records whose validation session never ran.
pub fn unattempted_trust(upstream_flag: Option<bool>) -> TrustResult {
    TrustResult {
        status: TrustStatus::Unknown,
        verify_code: None,
        verify_error: None,
        self_signed: classify_self_signed(upstream_flag, None, None),
    }
}

fn indeterminate(error: String, upstream_flag: Option<bool>) -> TrustResult {
    let self_signed = classify_self_signed(upstream_flag, None, Some(&error));
    TrustResult {
        status: TrustStatus::Unknown,
        verify_code: None,
        verify_error: Some(error),
        self_signed,
    }
}

/// Runs the validation session and classifies the outcome.
///
/// A completed handshake means the chain is trusted. A certificate rejection
/// from the verifier becomes `Untrusted` with the mapped verify code. Every
/// other failure, transport or otherwise, leaves the trust status `Unknown`
/// with the error text attached.
#[allow(clippy::too_many_arguments)]
pub async fn validate_chain(
    connector: &TlsConnector,
    endpoint: &str,
    server_name: &str,
    port: u16,
    timeout: Duration,
    self_issued_leaf: bool,
    upstream_flag: Option<bool>,
    stats: &ProcessingStats,
) -> TrustResult {
    debug!("Validating certificate chain for {server_name} via {endpoint}:{port}");

    let name = match ServerName::try_from(server_name.to_string()) {
        Ok(name) => name,
        // The inspection pass already counted the invalid name
        Err(e) => return indeterminate(format!("invalid server name: {e}"), upstream_flag),
    };

    let sock = match tokio::time::timeout(timeout, TcpStream::connect((endpoint, port))).await {
        Ok(Ok(sock)) => sock,
        Ok(Err(e)) => {
            let (error_type, message) = categorize_connect_error(&e, timeout);
            stats.increment_error(error_type);
            return indeterminate(message, upstream_flag);
        }
        Err(_) => {
            stats.increment_error(ErrorType::ConnectTimeout);
            return indeterminate(
                format!("connection timed out after {:.1}s", timeout.as_secs_f64()),
                upstream_flag,
            );
        }
    };

    match tokio::time::timeout(timeout, connector.connect(name, sock)).await {
        Ok(Ok(_)) => {
            debug!("Certificate chain for {server_name} is trusted");
            TrustResult {
                status: TrustStatus::Trusted,
                verify_code: None,
                verify_error: None,
                self_signed: classify_self_signed(upstream_flag, None, None),
            }
        }
        Ok(Err(e)) => match extract_certificate_error(&e) {
            Some(cert_error) => {
                let (code, text) = map_certificate_error(cert_error, self_issued_leaf);
                debug!("Certificate chain for {server_name} rejected: {text} (code {code})");
                stats.increment_info(InfoType::UntrustedCertificate);
                let self_signed = classify_self_signed(upstream_flag, Some(code), Some(&text));
                TrustResult {
                    status: TrustStatus::Untrusted,
                    verify_code: Some(code),
                    verify_error: Some(text),
                    self_signed,
                }
            }
            None => {
                stats.increment_error(ErrorType::TlsHandshakeError);
                indeterminate(format!("TLS handshake failed: {e}"), upstream_flag)
            }
        },
        Err(_) => {
            stats.increment_error(ErrorType::TlsHandshakeTimeout);
            indeterminate(
                format!("TLS handshake timed out after {:.1}s", timeout.as_secs_f64()),
                upstream_flag,
            )
        }
    }
}

/// Pulls the certificate rejection out of a handshake failure, if that is
/// what it was.
fn extract_certificate_error(error: &io::Error) -> Option<&CertificateError> {
    match error.get_ref()?.downcast_ref::<rustls::Error>()? {
        rustls::Error::InvalidCertificate(cert_error) => Some(cert_error),
        _ => None,
    }
}
