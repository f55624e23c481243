//! Report generation for update and matching runs.
//!
//! This module provides the persisted output formats:
//! - JSON: the structured diff report
//! - CSV: the flat diff summary and the matching output
//! - Summary: human-readable terminal output
//!
//! Files are written through [`ReportStore`], which names them after the run
//! timestamp so the backup and both diff files of one run line up.

mod csv;
mod json;
mod store;
mod summary;

pub use self::csv::{write_match_csv, DiffCsvReporter, MATCH_SLOTS};
pub use json::JsonDiffReporter;
pub use store::{
    backup_file_name, diff_csv_file_name, diff_file_name, run_timestamp, ReportStore,
};
pub use summary::SummaryReporter;

use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] ::csv::Error),
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
