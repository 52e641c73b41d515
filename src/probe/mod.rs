//! Per-record probing pipeline.
//!
//! Each record goes through up to four network phases: a TCP check on port
//! 80, a TCP check on port 443, and, when 443 answered, the certificate
//! inspection and chain validation sessions. Every phase is bounded by the
//! connect timeout and every outcome lands in the record; nothing here
//! aborts the run.

mod port;
mod tls;
mod trust;
mod verifier;

pub use port::probe_port;
pub use tls::{days_until, inspect_certificate};
pub use trust::{
    classify_self_signed, map_certificate_error, unattempted_trust, validate_chain,
    SELF_SIGNED_VERIFY_CODES,
};
pub use verifier::{inspection_config, validation_config};

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use tokio_rustls::TlsConnector;

use crate::config::{PORT_HTTP, PORT_HTTPS};
use crate::error_handling::{ErrorType, InfoType, ProcessingStats, WarningType};
use crate::models::{InputRecord, PortProbeResult, ProbeOutcome, ProbeRecord, ProbeTarget};
use crate::utils::timing::{duration_to_us, TargetTimingMetrics, TimingStats};

/// Shared resources needed to probe a record.
#[derive(Clone)]
pub struct ProbeContext {
    /// TLS connector that accepts any certificate, for metadata extraction
    pub inspect_connector: TlsConnector,
    /// TLS connector that verifies the chain against the webpki roots
    pub validate_connector: TlsConnector,
    /// Error statistics tracker
    pub stats: Arc<ProcessingStats>,
    /// Per-phase timing accumulator
    pub timing: Arc<TimingStats>,
    /// Timeout applied to each connect and handshake
    pub connect_timeout: Duration,
}

/// Probes a single record end to end.
///
/// The TCP checks always run. The TLS phases run only when port 443
/// answered and the record resolved to a probe target; otherwise the
/// certificate column stays empty and the trust status stays unknown.
pub async fn process_target(target: ProbeTarget, ctx: Arc<ProbeContext>) -> ProbeRecord {
    let ProbeTarget {
        record,
        endpoint,
        server_name,
    } = target;

    if endpoint.is_none() {
        ctx.stats.increment_error(ErrorType::UnresolvableTarget);
    }
    if record.record_name.trim().is_empty() {
        ctx.stats.increment_warning(WarningType::EmptyRecordName);
    }

    let total_start = Instant::now();
    let mut metrics = TargetTimingMetrics::default();

    let phase_start = Instant::now();
    let port_80 = probe_port(endpoint.as_deref(), PORT_HTTP, ctx.connect_timeout, &ctx.stats).await;
    metrics.connect_80_us = duration_to_us(phase_start.elapsed());

    let phase_start = Instant::now();
    let port_443 =
        probe_port(endpoint.as_deref(), PORT_HTTPS, ctx.connect_timeout, &ctx.stats).await;
    metrics.connect_443_us = duration_to_us(phase_start.elapsed());

    let (certificate, trust) = match (&endpoint, &server_name) {
        (Some(host), Some(sni)) if port_443.accessible => {
            let phase_start = Instant::now();
            let certificate = inspect_certificate(
                &ctx.inspect_connector,
                host,
                sni,
                PORT_HTTPS,
                ctx.connect_timeout,
                &ctx.stats,
            )
            .await;
            metrics.tls_inspect_us = duration_to_us(phase_start.elapsed());

            let phase_start = Instant::now();
            let trust = validate_chain(
                &ctx.validate_connector,
                host,
                sni,
                PORT_HTTPS,
                ctx.connect_timeout,
                certificate.self_issued(),
                record.self_signed_flag,
                &ctx.stats,
            )
            .await;
            metrics.trust_validate_us = duration_to_us(phase_start.elapsed());

            (Some(certificate), trust)
        }
        _ => (None, unattempted_trust(record.self_signed_flag)),
    };

    if trust.self_signed {
        ctx.stats.increment_info(InfoType::SelfSignedCertificate);
    }

    metrics.total_us = duration_to_us(total_start.elapsed());
    ctx.timing.record(&metrics);

    debug!(
        "Probed {} ({}): port 80 {}, port 443 {}, trust {}",
        record.record_name,
        record.record_type,
        if port_80.accessible { "open" } else { "closed" },
        if port_443.accessible { "open" } else { "closed" },
        trust.status.as_str()
    );

    ProbeRecord {
        record,
        outcome: ProbeOutcome {
            port_80,
            port_443,
            certificate,
            trust,
        },
    }
}

/// Builds the output record for a target whose processing hit the overall
/// per-target deadline.
pub fn timed_out_record(record: InputRecord, target_timeout: Duration) -> ProbeRecord {
    let error = format!(
        "target processing timed out after {:.1}s",
        target_timeout.as_secs_f64()
    );
    let trust = unattempted_trust(record.self_signed_flag);
    ProbeRecord {
        record,
        outcome: ProbeOutcome {
            port_80: PortProbeResult {
                port: PORT_HTTP,
                accessible: false,
                response_time: None,
                error: Some(error.clone()),
            },
            port_443: PortProbeResult {
                port: PORT_HTTPS,
                accessible: false,
                response_time: None,
                error: Some(error),
            },
            certificate: None,
            trust,
        },
    }
}
