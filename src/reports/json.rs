//! JSON diff report generator.

use serde::Serialize;

use super::ReportError;
use crate::diff::{ChangeReport, DiffResult, UpdateCounters};

/// JSON diff report generator
pub struct JsonDiffReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonDiffReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Render `{timestamp, statistics, changes}`.
    pub fn generate(&self, result: &DiffResult, timestamp: &str) -> Result<String, ReportError> {
        let report = JsonDiffReport {
            timestamp,
            statistics: &result.statistics,
            changes: &result.changes,
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        Ok(json)
    }
}

impl Default for JsonDiffReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonDiffReport<'a> {
    timestamp: &'a str,
    statistics: &'a UpdateCounters,
    changes: &'a ChangeReport,
}
