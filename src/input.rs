//! Input parsing for DNS record exports.
//!
//! The input is a CSV with one row per record. Three columns are required;
//! a `self_signed` column is honored when present, and every other column
//! rides along untouched into the output.

use std::path::Path;

use csv::StringRecord;
use log::info;

use crate::error_handling::InputError;
use crate::models::InputRecord;

/// Parses the upstream self-signed column, when recognizable.
///
/// Anything other than a boolean-ish value is treated as absent, so a
/// stray annotation never hides probe-derived classification.
fn parse_self_signed_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn require_column(
    headers: &StringRecord,
    column: &'static str,
    path: &Path,
) -> Result<usize, InputError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| InputError::MissingColumn {
            path: path.to_path_buf(),
            column,
        })
}

/// Reads the input CSV into memory.
///
/// Returns the header row alongside the parsed records; the header is
/// needed verbatim to build the output file.
pub fn read_input(path: &Path) -> Result<(StringRecord, Vec<InputRecord>), InputError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| InputError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let headers = reader
        .headers()
        .map_err(|e| InputError::Read {
            path: path.to_path_buf(),
            source: e,
        })?
        .clone();
    if headers.is_empty() {
        return Err(InputError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let type_idx = require_column(&headers, "record_type", path)?;
    let name_idx = require_column(&headers, "record_name", path)?;
    let value_idx = require_column(&headers, "record_value", path)?;
    let self_signed_idx = headers.iter().position(|h| h == "self_signed");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| InputError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        records.push(InputRecord {
            record_type: row.get(type_idx).unwrap_or_default().to_string(),
            record_name: row.get(name_idx).unwrap_or_default().to_string(),
            record_value: row.get(value_idx).unwrap_or_default().to_string(),
            self_signed_flag: self_signed_idx
                .and_then(|idx| row.get(idx))
                .and_then(parse_self_signed_flag),
            fields: row.iter().map(|f| f.to_string()).collect(),
        });
    }

    info!("Total records in file: {}", records.len());
    Ok((headers, records))
}
