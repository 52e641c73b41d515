//! Turns input records into connectable probe targets.
//!
//! No DNS queries happen here. A-type records carrying an IP literal are
//! probed at that literal address, so historical reachability is reported
//! even when the name no longer resolves. Everything else is probed by
//! hostname and resolution is deferred to the connect layer.

use std::net::IpAddr;

use crate::models::{InputRecord, ProbeTarget};

/// Normalizes a host string from the inventory: surrounding whitespace and
/// trailing root-zone dots are stripped.
pub fn sanitize_host(raw: &str) -> &str {
    raw.trim().trim_end_matches('.')
}

/// Pairs a record with the endpoint the prober should dial.
///
/// The endpoint is chosen once per record:
/// - `A` records (case-insensitive) whose value parses as an IP literal are
///   dialed at that literal.
/// - all other records are dialed at the sanitized `record_name`.
/// - a record offering neither yields no endpoint; the probes then report it
///   as unresolvable instead of dropping it.
///
/// TLS sessions present the sanitized name as SNI when one exists, falling
/// back to the endpoint itself for name-less literal records.
pub fn resolve_target(record: InputRecord) -> ProbeTarget {
    let host = sanitize_host(&record.record_name).to_string();

    let literal = if record.record_type.trim().eq_ignore_ascii_case("a") {
        let value = record.record_value.trim();
        value.parse::<IpAddr>().ok().map(|_| value.to_string())
    } else {
        None
    };

    let endpoint = match literal {
        Some(ip) => Some(ip),
        None if host.is_empty() => None,
        None => Some(host.clone()),
    };

    let server_name = if host.is_empty() {
        endpoint.clone()
    } else {
        Some(host)
    };

    ProbeTarget {
        record,
        endpoint,
        server_name,
    }
}
