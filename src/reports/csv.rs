//! CSV report generators.

use std::fs;
use std::path::Path;

use super::ReportError;
use crate::diff::DiffResult;
use crate::matching::MatchedRow;
use crate::model::CatalogEntry;

/// Number of match groups written per output row.
pub const MATCH_SLOTS: usize = 5;

const DIFF_HEADER: [&str; 8] = [
    "Change Type",
    "CPE Name",
    "Product Title",
    "Vendor",
    "Product",
    "Version",
    "References",
    "Deprecated",
];

const SLOT_COLUMNS: [&str; 5] = ["cpe", "vendor", "product", "versions", "found_by"];

/// Flat diff summary: one row per added, modified and newly deprecated entry.
pub struct DiffCsvReporter;

impl DiffCsvReporter {
    pub const fn new() -> Self {
        Self
    }

    pub fn generate(&self, result: &DiffResult) -> Result<String, ReportError> {
        let mut writer = ::csv::Writer::from_writer(Vec::new());
        writer.write_record(DIFF_HEADER)?;

        let changes = &result.changes;
        for entry in &changes.added {
            writer.write_record(diff_row("ADDED", entry, entry.deprecated))?;
        }
        for modified in &changes.modified {
            writer.write_record(diff_row("MODIFIED", &modified.new, modified.new.deprecated))?;
        }
        for entry in &changes.deprecated_transitions {
            writer.write_record(diff_row("DEPRECATED", entry, true))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::SerializationError(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}

impl Default for DiffCsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn diff_row(change: &str, entry: &CatalogEntry, deprecated: bool) -> [String; 8] {
    [
        change.to_string(),
        entry.cpe_name.clone(),
        entry.first_title().to_string(),
        entry.name_component(3).to_string(),
        entry.name_component(4).to_string(),
        entry.name_component(5).to_string(),
        entry.reference_urls().collect::<Vec<_>>().join("; "),
        if deprecated { "True" } else { "False" }.to_string(),
    ]
}

/// Write the matching output: the original columns, the group count, and
/// [`MATCH_SLOTS`] blank-padded group slots.
pub fn write_match_csv(
    path: &Path,
    header: &[String],
    rows: &[MatchedRow],
) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = ::csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let mut extended: Vec<String> = header.to_vec();
    extended.push("cpe_match_count".to_string());
    for slot in 1..=MATCH_SLOTS {
        extended.extend(SLOT_COLUMNS.iter().map(|col| format!("{col}_{slot}")));
    }
    writer.write_record(&extended)?;

    for row in rows {
        let mut record = row.original.clone();
        if record.len() < header.len() {
            record.resize(header.len(), String::new());
        }
        record.push(row.result.groups.len().to_string());
        for slot in 0..MATCH_SLOTS {
            match row.result.groups.get(slot) {
                Some(group) => record.extend([
                    group.cpe.clone(),
                    group.vendor.clone(),
                    group.product.clone(),
                    group.joined_versions(),
                    group.found_by.to_string(),
                ]),
                None => record.extend(std::iter::repeat(String::new()).take(SLOT_COLUMNS.len())),
            }
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
