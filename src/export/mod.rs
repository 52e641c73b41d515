//! Output for probe results.
//!
//! This module writes the enriched CSV: every input column preserved, probe
//! columns appended, rows streamed in completion order.

mod csv;

pub use self::csv::{default_output_path, start_csv_writer, APPENDED_COLUMNS};
