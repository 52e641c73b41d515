use chrono::{DateTime, Utc};

/// One row of the input inventory.
///
/// `fields` holds the complete original row in input header order so that
/// every input column, known or not, survives into the output unchanged.
/// The typed accessors below are the columns this crate acts on.
#[derive(Debug, Clone)]
pub struct InputRecord {
    pub record_type: String,
    pub record_name: String,
    pub record_value: String,
    /// Self-signed verdict supplied by an earlier pass, when the input
    /// carries a `self_signed` column with a parseable value.
    pub self_signed_flag: Option<bool>,
    pub fields: Vec<String>,
}

/// An input record paired with the endpoint the prober should dial.
///
/// `endpoint` is the host string handed to the connect layer; `server_name`
/// is what TLS sessions present as SNI. Both are `None` only when the record
/// offers nothing connectable, in which case the probes report the record as
/// unresolvable instead of dropping it.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub record: InputRecord,
    pub endpoint: Option<String>,
    pub server_name: Option<String>,
}

/// Outcome of one TCP connect attempt against one port.
pub struct PortProbeResult {
    pub port: u16,
    pub accessible: bool,
    /// Connect latency in seconds, present only when the connect succeeded.
    pub response_time: Option<f64>,
    pub error: Option<String>,
}

/// TLS certificate information extracted from the port 443 handshake.
///
/// Extraction runs against a session that accepts any certificate, so an
/// `Extracted` value says nothing about trust. `Failed` means connection,
/// handshake or parsing stopped before any metadata was available, which is
/// distinct from a certificate that merely decoded partially.
pub enum CertificateInfo {
    Extracted {
        subject: String,
        issuer: String,
        not_after: Option<DateTime<Utc>>,
        /// Exact fractional days between run time and `not_after`;
        /// negative once the certificate has expired.
        days_until_expiry: Option<f64>,
        /// Set when individual fields could not be decoded even though the
        /// certificate itself was obtained.
        cert_error: Option<String>,
    },
    Failed {
        cert_error: String,
    },
}

impl CertificateInfo {
    /// Whether the extracted leaf names itself as its own issuer.
    pub fn self_issued(&self) -> bool {
        match self {
            CertificateInfo::Extracted { subject, issuer, .. } => subject == issuer,
            CertificateInfo::Failed { .. } => false,
        }
    }
}

/// Chain-trust classification of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustStatus {
    /// The presented chain verifies against the well-known roots.
    Trusted,
    /// A handshake completed far enough to judge the chain, and it failed.
    Untrusted,
    /// No verdict was possible (port unreachable, handshake never reached
    /// certificate evaluation, or the target was unresolvable).
    Unknown,
}

impl TrustStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustStatus::Trusted => "trusted",
            TrustStatus::Untrusted => "untrusted",
            TrustStatus::Unknown => "unknown",
        }
    }
}

/// Result of the chain validation pass plus the self-signed classification.
pub struct TrustResult {
    pub status: TrustStatus,
    /// OpenSSL-style verify code, present only when validation itself failed.
    pub verify_code: Option<i32>,
    pub verify_error: Option<String>,
    pub self_signed: bool,
}

/// Everything the probe pipeline learned about one target.
pub struct ProbeOutcome {
    pub port_80: PortProbeResult,
    pub port_443: PortProbeResult,
    /// Present only when port 443 accepted a TCP connection.
    pub certificate: Option<CertificateInfo>,
    pub trust: TrustResult,
}

impl ProbeOutcome {
    /// A target counts as reachable when at least one probed port accepted.
    pub fn reachable(&self) -> bool {
        self.port_80.accessible || self.port_443.accessible
    }
}

/// Final, immutable record: the original input row plus probe results.
pub struct ProbeRecord {
    pub record: InputRecord,
    pub outcome: ProbeOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_status_strings() {
        assert_eq!(TrustStatus::Trusted.as_str(), "trusted");
        assert_eq!(TrustStatus::Untrusted.as_str(), "untrusted");
        assert_eq!(TrustStatus::Unknown.as_str(), "unknown");
    }

    #[test]
    fn test_certificate_info_self_issued() {
        let self_issued = CertificateInfo::Extracted {
            subject: "CN=example.com".to_string(),
            issuer: "CN=example.com".to_string(),
            not_after: None,
            days_until_expiry: None,
            cert_error: None,
        };
        assert!(self_issued.self_issued());

        let ca_issued = CertificateInfo::Extracted {
            subject: "CN=example.com".to_string(),
            issuer: "CN=Example CA".to_string(),
            not_after: None,
            days_until_expiry: None,
            cert_error: None,
        };
        assert!(!ca_issued.self_issued());

        let failed = CertificateInfo::Failed {
            cert_error: "handshake failed".to_string(),
        };
        assert!(!failed.self_issued());
    }

    #[test]
    fn test_outcome_reachable() {
        let open = PortProbeResult {
            port: 80,
            accessible: true,
            response_time: Some(0.012),
            error: None,
        };
        let closed = PortProbeResult {
            port: 443,
            accessible: false,
            response_time: None,
            error: Some("connection refused".to_string()),
        };
        let outcome = ProbeOutcome {
            port_80: open,
            port_443: closed,
            certificate: None,
            trust: TrustResult {
                status: TrustStatus::Unknown,
                verify_code: None,
                verify_error: None,
                self_signed: false,
            },
        };
        assert!(outcome.reachable());
    }
}
