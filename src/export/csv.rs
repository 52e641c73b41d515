//! CSV output for probe results.
//!
//! The output file carries every input column unchanged, with the probe
//! columns appended. Rows are written in completion order by a dedicated
//! writer task fed from a channel, so probing never blocks on disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::SecondsFormat;
use csv::{StringRecord, Writer};
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::config::{OUTPUT_SUFFIX, WRITER_FLUSH_INTERVAL_SECS};
use crate::error_handling::OutputError;
use crate::models::{CertificateInfo, ProbeRecord};

/// Columns appended to each input row, in output order.
pub const APPENDED_COLUMNS: [&str; 16] = [
    "port_80_accessible",
    "port_80_response_time",
    "port_80_error",
    "port_443_accessible",
    "port_443_response_time",
    "port_443_error",
    "ssl_certificate",
    "cert_expiry_date",
    "days_until_expiry",
    "cert_issuer",
    "cert_subject",
    "cert_error",
    "self_signed",
    "cert_trust_status",
    "cert_verify_code",
    "cert_verify_error",
];

/// Derives the output path from the input path.
///
/// `records.csv` becomes `records_accessibility.csv`, in the same directory.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let name = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}{OUTPUT_SUFFIX}.{ext}"),
        None => format!("{stem}{OUTPUT_SUFFIX}"),
    };
    input.with_file_name(name)
}

fn bool_field(value: bool) -> String {
    value.to_string()
}

/// Flattens a probe record into one output row.
fn output_row(record: &ProbeRecord) -> Vec<String> {
    let outcome = &record.outcome;

    let mut row = record.record.fields.clone();
    row.push(bool_field(outcome.port_80.accessible));
    row.push(
        outcome
            .port_80
            .response_time
            .map(|t| format!("{:.3}", t))
            .unwrap_or_default(),
    );
    row.push(outcome.port_80.error.clone().unwrap_or_default());
    row.push(bool_field(outcome.port_443.accessible));
    row.push(
        outcome
            .port_443
            .response_time
            .map(|t| format!("{:.3}", t))
            .unwrap_or_default(),
    );
    row.push(outcome.port_443.error.clone().unwrap_or_default());

    match &outcome.certificate {
        Some(CertificateInfo::Extracted {
            subject,
            issuer,
            not_after,
            days_until_expiry,
            cert_error,
        }) => {
            row.push(bool_field(true));
            row.push(
                not_after
                    .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .unwrap_or_default(),
            );
            row.push(
                days_until_expiry
                    .map(|days| format!("{:.2}", days))
                    .unwrap_or_default(),
            );
            row.push(issuer.clone());
            row.push(subject.clone());
            row.push(cert_error.clone().unwrap_or_default());
        }
        Some(CertificateInfo::Failed { cert_error }) => {
            row.push(bool_field(false));
            row.push(String::new());
            row.push(String::new());
            row.push(String::new());
            row.push(String::new());
            row.push(cert_error.clone());
        }
        None => {
            row.push(bool_field(false));
            row.push(String::new());
            row.push(String::new());
            row.push(String::new());
            row.push(String::new());
            row.push(String::new());
        }
    }

    row.push(bool_field(outcome.trust.self_signed));
    row.push(outcome.trust.status.as_str().to_string());
    row.push(
        outcome
            .trust
            .verify_code
            .map(|code| code.to_string())
            .unwrap_or_default(),
    );
    row.push(outcome.trust.verify_error.clone().unwrap_or_default());

    row
}

/// Starts the CSV writer task that consumes probe records from a channel.
///
/// The output file and its header row are written before the task starts,
/// so an unwritable output path fails the run up front. The task flushes on
/// an interval and drains the channel on shutdown; dropping the sender is
/// the shutdown signal. Returns the sender and a handle resolving to the
/// number of rows written.
pub fn start_csv_writer(
    path: &Path,
    input_headers: &StringRecord,
) -> Result<
    (
        mpsc::UnboundedSender<ProbeRecord>,
        tokio::task::JoinHandle<Result<usize, OutputError>>,
    ),
    OutputError,
> {
    let mut writer = Writer::from_path(path).map_err(|e| OutputError::Create {
        path: path.to_path_buf(),
        source: e,
    })?;

    let header: Vec<&str> = input_headers
        .iter()
        .chain(APPENDED_COLUMNS.iter().copied())
        .collect();
    writer.write_record(&header)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<ProbeRecord>();

    let handle = tokio::spawn(async move {
        let mut interval_timer = interval(Duration::from_secs(WRITER_FLUSH_INTERVAL_SECS));
        let mut written = 0usize;

        loop {
            tokio::select! {
                record = rx.recv() => {
                    match record {
                        Some(record) => {
                            if let Err(e) = writer.write_record(output_row(&record)) {
                                log::error!(
                                    "Error writing output row for {}: {}",
                                    record.record.record_name,
                                    e
                                );
                                return Err(OutputError::Write(e));
                            }
                            written += 1;
                        }
                        None => {
                            // Channel closed, flush remaining rows and exit
                            log::info!("Output writer channel closed, flushing remaining rows...");
                            writer.flush().map_err(|e| {
                                log::error!("Error flushing output file: {}", e);
                                OutputError::Flush(e)
                            })?;
                            log::info!("Output writer shutdown complete ({} rows)", written);
                            return Ok(written);
                        }
                    }
                }
                // Periodic flush so progress survives an interrupted run
                _ = interval_timer.tick() => {
                    if let Err(e) = writer.flush() {
                        log::error!("Error during periodic flush: {}", e);
                        return Err(OutputError::Flush(e));
                    }
                }
            }
        }
    });

    Ok((tx, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PortProbeResult, ProbeOutcome, TrustResult, TrustStatus};
    use crate::models::InputRecord;
    use chrono::{TimeZone, Utc};

    fn sample_record() -> ProbeRecord {
        ProbeRecord {
            record: InputRecord {
                record_type: "A".to_string(),
                record_name: "web.example.com".to_string(),
                record_value: "192.0.2.10".to_string(),
                self_signed_flag: None,
                fields: vec![
                    "A".to_string(),
                    "web.example.com".to_string(),
                    "192.0.2.10".to_string(),
                    "extra".to_string(),
                ],
            },
            outcome: ProbeOutcome {
                port_80: PortProbeResult {
                    port: 80,
                    accessible: true,
                    response_time: Some(0.0123),
                    error: None,
                },
                port_443: PortProbeResult {
                    port: 443,
                    accessible: true,
                    response_time: Some(0.4567),
                    error: None,
                },
                certificate: Some(CertificateInfo::Extracted {
                    subject: "CN=web.example.com".to_string(),
                    issuer: "CN=Example CA".to_string(),
                    not_after: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
                    days_until_expiry: Some(42.126),
                    cert_error: None,
                }),
                trust: TrustResult {
                    status: TrustStatus::Untrusted,
                    verify_code: Some(18),
                    verify_error: Some("self signed certificate".to_string()),
                    self_signed: true,
                },
            },
        }
    }

    #[test]
    fn test_default_output_path_keeps_extension() {
        let path = default_output_path(Path::new("/tmp/records.csv"));
        assert_eq!(path, PathBuf::from("/tmp/records_accessibility.csv"));
    }

    #[test]
    fn test_default_output_path_without_extension() {
        let path = default_output_path(Path::new("records"));
        assert_eq!(path, PathBuf::from("records_accessibility"));
    }

    #[test]
    fn test_output_row_appends_in_column_order() {
        let record = sample_record();
        let row = output_row(&record);

        assert_eq!(row.len(), 4 + APPENDED_COLUMNS.len());
        // Input columns first, untouched
        assert_eq!(&row[..4], record.record.fields.as_slice());

        let appended = &row[4..];
        assert_eq!(appended[0], "true");
        assert_eq!(appended[1], "0.012");
        assert_eq!(appended[2], "");
        assert_eq!(appended[3], "true");
        assert_eq!(appended[4], "0.457");
        assert_eq!(appended[5], "");
        assert_eq!(appended[6], "true");
        assert_eq!(appended[7], "2026-01-02T03:04:05Z");
        assert_eq!(appended[8], "42.13");
        assert_eq!(appended[9], "CN=Example CA");
        assert_eq!(appended[10], "CN=web.example.com");
        assert_eq!(appended[11], "");
        assert_eq!(appended[12], "true");
        assert_eq!(appended[13], "untrusted");
        assert_eq!(appended[14], "18");
        assert_eq!(appended[15], "self signed certificate");
    }

    #[test]
    fn test_output_row_with_failed_extraction() {
        let mut record = sample_record();
        record.outcome.certificate = Some(CertificateInfo::Failed {
            cert_error: "TLS handshake failed: peer is rude".to_string(),
        });
        record.outcome.trust = TrustResult {
            status: TrustStatus::Unknown,
            verify_code: None,
            verify_error: None,
            self_signed: false,
        };

        let row = output_row(&record);
        let appended = &row[4..];
        assert_eq!(appended[6], "false");
        assert_eq!(appended[7], "");
        assert_eq!(appended[8], "");
        assert_eq!(appended[9], "");
        assert_eq!(appended[10], "");
        assert_eq!(appended[11], "TLS handshake failed: peer is rude");
        assert_eq!(appended[12], "false");
        assert_eq!(appended[13], "unknown");
        assert_eq!(appended[14], "");
        assert_eq!(appended[15], "");
    }

    #[tokio::test]
    async fn test_writer_appends_columns_and_counts_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let headers = StringRecord::from(vec![
            "record_type",
            "record_name",
            "record_value",
            "extra",
        ]);

        let (tx, handle) = start_csv_writer(&path, &headers).unwrap();
        tx.send(sample_record()).unwrap();
        tx.send(sample_record()).unwrap();
        drop(tx);

        let written = handle.await.unwrap().unwrap();
        assert_eq!(written, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(header.len(), 4 + APPENDED_COLUMNS.len());
        assert_eq!(&header[..4], ["record_type", "record_name", "record_value", "extra"]);
        assert_eq!(header[4..], APPENDED_COLUMNS);

        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "web.example.com");
    }
}
