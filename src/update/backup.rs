//! Backup of the current catalog contents.

use std::path::PathBuf;

use crate::backend::SearchBackend;
use crate::error::{CatalogError, ErrorContext, Result};
use crate::model::Snapshot;
use crate::reports::{backup_file_name, ReportStore};

/// Export every indexed entry and write it to `cpe_backup_<timestamp>.json`.
///
/// Returns the exported entries as a snapshot together with the file path.
pub fn create_backup<B: SearchBackend + ?Sized>(
    backend: &B,
    store: &ReportStore,
    timestamp: &str,
    scroll_size: usize,
) -> Result<(Snapshot, PathBuf)> {
    tracing::info!("Creating backup of current catalog");
    let entries = backend
        .export_all(scroll_size)
        .context("exporting catalog")?;

    let path = store
        .store_json(&backup_file_name(timestamp), &entries)
        .map_err(|e| CatalogError::report("writing backup", e))?;
    tracing::info!(
        "Backup created: {} ({} entries)",
        path.display(),
        entries.len()
    );

    Ok((Snapshot::from_entries(entries), path))
}
