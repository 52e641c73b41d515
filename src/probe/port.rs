//! Bounded-timeout TCP connect probes.

use std::time::{Duration, Instant};

use log::debug;
use tokio::net::TcpStream;

use crate::error_handling::{categorize_connect_error, ErrorType, ProcessingStats};
use crate::models::PortProbeResult;

/// Probes a single port with one TCP connect attempt.
///
/// The elapsed time covers exactly the connect call, including any name
/// resolution the connect performs. The socket is closed as soon as the
/// connect outcome is known; nothing is written to it.
///
/// A record with no endpoint still produces a result so it reaches the
/// output; its error is the fixed string `unresolvable target`.
pub async fn probe_port(
    endpoint: Option<&str>,
    port: u16,
    timeout: Duration,
    stats: &ProcessingStats,
) -> PortProbeResult {
    let Some(host) = endpoint else {
        return PortProbeResult {
            port,
            accessible: false,
            response_time: None,
            error: Some("unresolvable target".to_string()),
        };
    };

    let started = Instant::now();
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            let elapsed = started.elapsed().as_secs_f64();
            drop(stream);
            debug!("{host}:{port} accepted in {elapsed:.3}s");
            PortProbeResult {
                port,
                accessible: true,
                response_time: Some(elapsed),
                error: None,
            }
        }
        Ok(Err(e)) => {
            let (error_type, message) = categorize_connect_error(&e, timeout);
            stats.increment_error(error_type);
            debug!("{host}:{port} failed: {message}");
            PortProbeResult {
                port,
                accessible: false,
                response_time: None,
                error: Some(message),
            }
        }
        Err(_) => {
            stats.increment_error(ErrorType::ConnectTimeout);
            let message = format!("connection timed out after {:.1}s", timeout.as_secs_f64());
            debug!("{host}:{port} {message}");
            PortProbeResult {
                port,
                accessible: false,
                response_time: None,
                error: Some(message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_open_port_is_accessible() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let stats = ProcessingStats::new();

        let result = probe_port(Some("127.0.0.1"), port, TIMEOUT, &stats).await;

        assert!(result.accessible);
        assert_eq!(result.port, port);
        assert!(result.error.is_none());
        assert!(result.response_time.is_some());
        assert!(result.response_time.unwrap() >= 0.0);
        assert_eq!(stats.total_errors(), 0);
    }

    #[tokio::test]
    async fn test_closed_port_is_refused() {
        // Bind to grab a free port, then release it before probing
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let stats = ProcessingStats::new();

        let result = probe_port(Some("127.0.0.1"), port, TIMEOUT, &stats).await;

        assert!(!result.accessible);
        assert!(result.response_time.is_none());
        assert_eq!(result.error.as_deref(), Some("connection refused"));
        assert_eq!(stats.get_error_count(ErrorType::ConnectionRefused), 1);
    }

    #[tokio::test]
    async fn test_missing_endpoint_reports_unresolvable() {
        let stats = ProcessingStats::new();

        let result = probe_port(None, 80, TIMEOUT, &stats).await;

        assert!(!result.accessible);
        assert_eq!(result.error.as_deref(), Some("unresolvable target"));
        assert!(result.response_time.is_none());
    }
}
