//! TLS certificate inspection.
//!
//! The inspection session runs with a verifier that accepts any certificate,
//! so metadata can be read from expired, self-signed, or private-CA
//! deployments. Whether the chain actually validates is the trust pass's
//! business, not this module's.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use x509_parser::certificate::X509Certificate;

use crate::error_handling::{
    categorize_connect_error, ErrorType, InfoType, ProcessingStats, WarningType,
};
use crate::models::CertificateInfo;

/// Number of fractional days between `now` and `not_after`.
///
/// Negative once the certificate has expired. Millisecond resolution is kept
/// so short-lived certificates near expiry are still classified correctly.
pub fn days_until(not_after: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (not_after - now).num_milliseconds() as f64 / 86_400_000.0
}

/// Connects to the TLS port and extracts leaf certificate metadata.
///
/// Never fails the record: every outcome is expressed as `CertificateInfo`,
/// with `Failed` covering everything that stopped the certificate from being
/// read and `Extracted` carrying whatever fields decoded, plus a `cert_error`
/// for any that did not.
pub async fn inspect_certificate(
    connector: &TlsConnector,
    endpoint: &str,
    server_name: &str,
    port: u16,
    timeout: Duration,
    stats: &ProcessingStats,
) -> CertificateInfo {
    debug!("Inspecting certificate for {server_name} via {endpoint}:{port}");

    let name = match ServerName::try_from(server_name.to_string()) {
        Ok(name) => name,
        Err(e) => {
            stats.increment_warning(WarningType::InvalidServerName);
            return CertificateInfo::Failed {
                cert_error: format!("invalid server name: {e}"),
            };
        }
    };

    let sock = match tokio::time::timeout(timeout, TcpStream::connect((endpoint, port))).await {
        Ok(Ok(sock)) => sock,
        Ok(Err(e)) => {
            let (error_type, message) = categorize_connect_error(&e, timeout);
            stats.increment_error(error_type);
            return CertificateInfo::Failed {
                cert_error: message,
            };
        }
        Err(_) => {
            stats.increment_error(ErrorType::ConnectTimeout);
            return CertificateInfo::Failed {
                cert_error: format!(
                    "connection timed out after {:.1}s",
                    timeout.as_secs_f64()
                ),
            };
        }
    };

    let tls_stream = match tokio::time::timeout(timeout, connector.connect(name, sock)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            stats.increment_error(ErrorType::TlsHandshakeError);
            return CertificateInfo::Failed {
                cert_error: format!("TLS handshake failed: {e}"),
            };
        }
        Err(_) => {
            stats.increment_error(ErrorType::TlsHandshakeTimeout);
            return CertificateInfo::Failed {
                cert_error: format!(
                    "TLS handshake timed out after {:.1}s",
                    timeout.as_secs_f64()
                ),
            };
        }
    };

    let peer_certs = tls_stream.get_ref().1.peer_certificates();
    let Some(cert_der) = peer_certs.and_then(|certs| certs.first()) else {
        return CertificateInfo::Failed {
            cert_error: "no peer certificate presented".to_string(),
        };
    };

    debug!(
        "{server_name} presented a {} byte leaf certificate",
        cert_der.as_ref().len()
    );

    let (_, cert) = match x509_parser::parse_x509_certificate(cert_der.as_ref()) {
        Ok(parsed) => parsed,
        Err(e) => {
            stats.increment_error(ErrorType::CertificateParseError);
            return CertificateInfo::Failed {
                cert_error: format!("certificate parse error: {e}"),
            };
        }
    };

    let subject = cert.tbs_certificate.subject.to_string();
    let issuer = cert.tbs_certificate.issuer.to_string();

    let (not_after, cert_error) = match parse_not_after(&cert) {
        Ok(ts) => (Some(ts), None),
        Err(e) => {
            stats.increment_warning(WarningType::PartialCertificateMetadata);
            (None, Some(e))
        }
    };

    let days_until_expiry = not_after.map(|ts| days_until(ts, Utc::now()));
    if days_until_expiry.is_some_and(|days| days < 0.0) {
        stats.increment_info(InfoType::CertificateExpired);
    }

    debug!("Certificate metadata extracted for {server_name}");

    CertificateInfo::Extracted {
        subject,
        issuer,
        not_after,
        days_until_expiry,
        cert_error,
    }
}

/// Decodes the certificate's not-after timestamp into UTC.
fn parse_not_after(cert: &X509Certificate<'_>) -> Result<DateTime<Utc>, String> {
    let raw = cert
        .tbs_certificate
        .validity
        .not_after
        .to_rfc2822()
        .map_err(|e| format!("not_after conversion error: {e}"))?;

    let parsed = DateTime::parse_from_str(&raw, "%a, %d %b %Y %H:%M:%S %z")
        .map_err(|_| format!("not_after parse error: unexpected timestamp `{raw}`"))?;
    Ok(parsed.with_timezone(&Utc))
}
