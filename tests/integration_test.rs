//! Integration tests for the probing pipeline.
//!
//! These tests drive `run_probe` end to end with controlled inputs. The
//! fast tests use records that cannot be dialed (no endpoint, or a name
//! under the reserved `.invalid` TLD), so no probe reaches a live host.
//!
//! End-to-end tests marked `#[ignore]` need outbound network access.
//! To run locally: `cargo test -- --ignored`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use record_prober::export::APPENDED_COLUMNS;
use record_prober::initialization::init_crypto_provider;
use record_prober::{run_probe, Config, LogLevel};
use tempfile::TempDir;

/// Helper function to write an input CSV into a temp directory
fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write input file");
    path
}

/// Helper function to create a basic Config for testing
fn create_test_config(input_file: PathBuf, output_file: Option<PathBuf>) -> Config {
    Config {
        input_file,
        output_file,
        timeout: 0.5,
        workers: 4,
        log_level: LogLevel::Error, // Reduce noise in tests
        ..Default::default()
    }
}

/// Helper function to read an output CSV back as header + rows
fn read_output(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open output file");
    let headers: Vec<String> = reader
        .headers()
        .expect("Failed to read output header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|row| {
            row.expect("Failed to read output row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    (headers, rows)
}

/// Index of an appended column in an output row, given the input width.
fn col(input_width: usize, name: &str) -> usize {
    input_width
        + APPENDED_COLUMNS
            .iter()
            .position(|c| *c == name)
            .unwrap_or_else(|| panic!("No appended column named {name:?}"))
}

/// Finds the output row whose `column` field equals `value`.
fn find_row<'a>(rows: &'a [Vec<String>], column: usize, value: &str) -> &'a [String] {
    rows.iter()
        .find(|row| row[column] == value)
        .unwrap_or_else(|| panic!("No output row with value {value:?} in column {column}"))
}

#[tokio::test]
async fn test_unprobeable_records_flow_through_pipeline() {
    init_crypto_provider();
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_input(
        &dir,
        "records.csv",
        "record_type,record_name,record_value,environment\n\
         TXT,,v=spf1 include:mail.example.com ~all,prod\n\
         CNAME,,www.example.com,dev\n\
         MX,,10 mail.example.com,shared\n",
    );
    let output = dir.path().join("out.csv");
    let config = create_test_config(input, Some(output.clone()));

    let report = run_probe(config).await.expect("run_probe should succeed");
    assert_eq!(report.total_records, 3);
    assert_eq!(report.unreachable, 3);
    assert_eq!(report.reachable, 0);
    assert_eq!(report.output_path, output);
    assert!(report.elapsed_seconds >= 0.0);

    let (headers, rows) = read_output(&output);
    let mut expected: Vec<String> = ["record_type", "record_name", "record_value", "environment"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    expected.extend(APPENDED_COLUMNS.iter().map(|s| s.to_string()));
    assert_eq!(headers, expected);

    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.len(), headers.len());
    }

    let input_width = 4;
    let row = find_row(&rows, 3, "prod");
    assert_eq!(row[0], "TXT");
    assert_eq!(row[col(input_width, "port_80_accessible")], "false");
    assert_eq!(row[col(input_width, "port_80_response_time")], "");
    assert_eq!(
        row[col(input_width, "port_80_error")],
        "unresolvable target"
    );
    assert_eq!(row[col(input_width, "port_443_accessible")], "false");
    assert_eq!(
        row[col(input_width, "port_443_error")],
        "unresolvable target"
    );
    assert_eq!(row[col(input_width, "ssl_certificate")], "false");
    assert_eq!(row[col(input_width, "cert_expiry_date")], "");
    assert_eq!(row[col(input_width, "days_until_expiry")], "");
    assert_eq!(row[col(input_width, "cert_issuer")], "");
    assert_eq!(row[col(input_width, "cert_subject")], "");
    assert_eq!(row[col(input_width, "cert_error")], "");
    assert_eq!(row[col(input_width, "self_signed")], "false");
    assert_eq!(row[col(input_width, "cert_trust_status")], "unknown");
    assert_eq!(row[col(input_width, "cert_verify_code")], "");
    assert_eq!(row[col(input_width, "cert_verify_error")], "");

    // The other rows carry their extra column through untouched
    find_row(&rows, 3, "dev");
    find_row(&rows, 3, "shared");
}

#[tokio::test]
async fn test_unresolvable_hostname_is_reported_per_port() {
    init_crypto_provider();
    let dir = TempDir::new().expect("Failed to create temp directory");
    // .invalid is reserved (RFC 2606); resolution can never succeed
    let input = write_input(
        &dir,
        "records.csv",
        "record_type,record_name,record_value\n\
         A,record-prober-test.invalid,not-an-address\n",
    );
    let output = dir.path().join("out.csv");
    let config = create_test_config(input, Some(output.clone()));

    let report = run_probe(config).await.expect("run_probe should succeed");
    assert_eq!(report.total_records, 1);
    assert_eq!(report.unreachable, 1);

    let (headers, rows) = read_output(&output);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.len(), headers.len());

    let input_width = 3;
    assert_eq!(row[col(input_width, "port_80_accessible")], "false");
    assert!(
        !row[col(input_width, "port_80_error")].is_empty(),
        "A failed connect should report an error"
    );
    assert_eq!(row[col(input_width, "port_443_accessible")], "false");
    assert!(!row[col(input_width, "port_443_error")].is_empty());
    assert_eq!(row[col(input_width, "ssl_certificate")], "false");
    assert_eq!(row[col(input_width, "cert_trust_status")], "unknown");
}

#[tokio::test]
async fn test_default_output_path_sits_next_to_input() {
    init_crypto_provider();
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_input(
        &dir,
        "records.csv",
        "record_type,record_name,record_value\nTXT,,v=spf1 -all\n",
    );
    let config = create_test_config(input, None);

    let report = run_probe(config).await.expect("run_probe should succeed");

    let expected = dir.path().join("records_accessibility.csv");
    assert_eq!(report.output_path, expected);
    assert!(expected.exists(), "Default output file should be created");

    let (_, rows) = read_output(&expected);
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_rejects_non_positive_timeout() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_input(
        &dir,
        "records.csv",
        "record_type,record_name,record_value\nTXT,,v=spf1 -all\n",
    );
    let mut config = create_test_config(input, Some(dir.path().join("out.csv")));
    config.timeout = 0.0;

    let err = run_probe(config)
        .await
        .expect_err("A zero timeout should be rejected");
    assert!(
        format!("{err:#}").contains("timeout"),
        "Unexpected error: {err:#}"
    );
}

#[tokio::test]
async fn test_rejects_oversized_timeout() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_input(
        &dir,
        "records.csv",
        "record_type,record_name,record_value\nTXT,,v=spf1 -all\n",
    );
    let mut config = create_test_config(input, Some(dir.path().join("out.csv")));
    config.timeout = 1e300;

    // Must come back as an error, not a Duration overflow panic
    let err = run_probe(config)
        .await
        .expect_err("An oversized timeout should be rejected");
    assert!(
        format!("{err:#}").contains("timeout"),
        "Unexpected error: {err:#}"
    );
}

#[tokio::test]
async fn test_rejects_zero_workers() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_input(
        &dir,
        "records.csv",
        "record_type,record_name,record_value\nTXT,,v=spf1 -all\n",
    );
    let mut config = create_test_config(input, Some(dir.path().join("out.csv")));
    config.workers = 0;

    // Must fail up front; a zero-permit pool would otherwise leave the
    // submission loop waiting forever
    let run = tokio::time::timeout(Duration::from_secs(10), run_probe(config))
        .await
        .expect("run_probe should return instead of stalling");
    let err = run.expect_err("Zero workers should be rejected");
    assert!(
        format!("{err:#}").contains("worker"),
        "Unexpected error: {err:#}"
    );
}

/// End-to-end probe of a live host with a publicly trusted certificate.
#[tokio::test]
#[ignore] // Requires outbound network access; run with: cargo test -- --ignored
async fn test_probe_real_host_end_to_end() {
    init_crypto_provider();
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_input(
        &dir,
        "records.csv",
        "record_type,record_name,record_value\n\
         CNAME,example.com,example.com\n",
    );
    let output = dir.path().join("out.csv");
    let config = Config {
        input_file: input,
        output_file: Some(output.clone()),
        log_level: LogLevel::Error,
        ..Default::default()
    };

    let report = run_probe(config).await.expect("run_probe should succeed");
    assert_eq!(report.total_records, 1);
    assert_eq!(report.reachable, 1);

    let (_, rows) = read_output(&output);
    let row = &rows[0];
    let input_width = 3;
    assert_eq!(row[col(input_width, "port_443_accessible")], "true");
    assert_eq!(row[col(input_width, "ssl_certificate")], "true");
    assert_eq!(row[col(input_width, "cert_trust_status")], "trusted");
    assert_eq!(row[col(input_width, "cert_verify_code")], "");
    assert_eq!(row[col(input_width, "self_signed")], "false");
    assert!(!row[col(input_width, "cert_expiry_date")].is_empty());
    row[col(input_width, "days_until_expiry")]
        .parse::<f64>()
        .expect("days_until_expiry should be numeric");
    assert!(!row[col(input_width, "cert_issuer")].is_empty());
}
