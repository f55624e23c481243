//! Update run sequencing.

use std::path::PathBuf;

use super::backup::create_backup;
use super::{UpdateFailure, UpdateOptions, UpdateOutcome, UpdatePhase};
use crate::backend::{index_entries, SearchBackend};
use crate::config::UpdateConfig;
use crate::diff::{DiffEngine, DiffResult};
use crate::error::{CatalogError, ErrorContext, Result};
use crate::feed::{load_snapshot, FeedSource, SnapshotLoad};
use crate::model::{CatalogEntry, Snapshot};
use crate::reports::{
    diff_csv_file_name, diff_file_name, run_timestamp, DiffCsvReporter, JsonDiffReporter,
    ReportStore,
};

type PhaseResult<T> = std::result::Result<T, UpdateFailure>;

/// Runs the update phases against a backend and a feed source.
pub struct UpdateOrchestrator<B, F> {
    backend: B,
    feed: F,
    config: UpdateConfig,
}

impl<B: SearchBackend, F: FeedSource> UpdateOrchestrator<B, F> {
    pub fn new(backend: B, feed: F, config: UpdateConfig) -> Self {
        Self {
            backend,
            feed,
            config,
        }
    }

    /// Run an update with a fresh timestamp.
    pub fn run(&self, options: UpdateOptions) -> UpdateOutcome {
        self.run_at(options, &run_timestamp())
    }

    /// Run an update, naming every file after `timestamp`.
    pub fn run_at(&self, options: UpdateOptions, timestamp: &str) -> UpdateOutcome {
        tracing::info!("Starting CPE catalog update");
        let mut outcome = UpdateOutcome {
            timestamp: timestamp.to_string(),
            ..UpdateOutcome::default()
        };

        match self.execute(options, &mut outcome) {
            Ok(()) => tracing::info!(
                "Update completed successfully - {} documents indexed",
                outcome.total_indexed
            ),
            Err(failure) => {
                tracing::error!("Update failed: {}", failure);
                outcome.failure = Some(failure);
            }
        }
        outcome
    }

    fn execute(&self, options: UpdateOptions, outcome: &mut UpdateOutcome) -> PhaseResult<()> {
        let old = if options.create_diff {
            self.backup(&outcome.timestamp).map(|(snapshot, path)| {
                outcome.backup_file = Some(path);
                snapshot
            })
        } else {
            None
        };

        self.download(options.force_download)?;
        let new = self.load()?;

        if let Some(old) = &old {
            let (result, json_path, csv_path) = self.diff(old, &new, &outcome.timestamp)?;
            outcome.statistics = Some(result.statistics);
            outcome.diff_file = Some(json_path);
            outcome.csv_diff_file = Some(csv_path);
        }

        outcome.total_indexed = self.reindex(new)?;
        Ok(())
    }

    /// Export the current catalog. Failure is logged and yields no snapshot,
    /// which disables the diff for this run.
    fn backup(&self, timestamp: &str) -> Option<(Snapshot, PathBuf)> {
        let result = ReportStore::open(&self.config.backup_dir)
            .map_err(|e| CatalogError::report("opening backup directory", e))
            .and_then(|store| {
                create_backup(&self.backend, &store, timestamp, self.config.scroll_size)
            });
        match result {
            Ok((snapshot, path)) => {
                tracing::info!("Loaded {} entries from current catalog", snapshot.len());
                Some((snapshot, path))
            }
            Err(e) => {
                tracing::error!("Backup failed, continuing without diff: {}", e);
                None
            }
        }
    }

    fn download(&self, force: bool) -> PhaseResult<()> {
        tracing::info!("Downloading latest NVD CPE feed");
        self.feed.fetch(force).map_err(|e| {
            UpdateFailure::new(
                UpdatePhase::Download,
                format!("Failed to download latest data: {e}"),
            )
        })
    }

    fn load(&self) -> PhaseResult<Snapshot> {
        let files = self.feed.chunk_files().map_err(|e| {
            UpdateFailure::new(UpdatePhase::Load, format!("No chunk files after download: {e}"))
        })?;
        if files.is_empty() {
            return Err(UpdateFailure::new(
                UpdatePhase::Load,
                "No chunk files found after download",
            ));
        }

        let SnapshotLoad { snapshot, .. } = load_snapshot(&files);
        if snapshot.is_empty() {
            return Err(UpdateFailure::new(
                UpdatePhase::Load,
                format!("No records parsed from {} chunk files", files.len()),
            ));
        }
        tracing::info!("Loaded {} entries from new data", snapshot.len());
        Ok(snapshot)
    }

    fn diff(
        &self,
        old: &Snapshot,
        new: &Snapshot,
        timestamp: &str,
    ) -> PhaseResult<(DiffResult, PathBuf, PathBuf)> {
        tracing::info!("Generating diff between old and new data");
        let result = DiffEngine::new()
            .include_unchanged(self.config.include_unchanged)
            .diff(old, new);

        let (json_path, csv_path) = self
            .write_diff_reports(&result, timestamp)
            .map_err(|e| {
                UpdateFailure::new(UpdatePhase::Diff, format!("Failed to write diff reports: {e}"))
            })?;

        let stats = &result.statistics;
        tracing::info!(
            "Diff generated - Added: {}, Modified: {}, Deprecated: {}, Removed: {}, Unchanged: {}",
            stats.added,
            stats.modified,
            stats.deprecated_transitions,
            stats.removed,
            stats.unchanged
        );
        Ok((result, json_path, csv_path))
    }

    fn write_diff_reports(&self, result: &DiffResult, timestamp: &str) -> Result<(PathBuf, PathBuf)> {
        let store = ReportStore::open(&self.config.diff_dir).context("opening diff directory")?;

        let json = JsonDiffReporter::new()
            .generate(result, timestamp)
            .context("rendering diff report")?;
        let json_path = store
            .store(&diff_file_name(timestamp), json.as_bytes())
            .context("writing diff report")?;
        tracing::info!("Diff report saved: {}", json_path.display());

        let csv = DiffCsvReporter::new()
            .generate(result)
            .context("rendering CSV diff summary")?;
        let csv_path = store
            .store(&diff_csv_file_name(timestamp), csv.as_bytes())
            .context("writing CSV diff summary")?;
        tracing::info!("CSV diff summary saved: {}", csv_path.display());

        Ok((json_path, csv_path))
    }

    fn reindex(&self, new: Snapshot) -> PhaseResult<usize> {
        tracing::info!("Rebuilding catalog index");
        if let Err(e) = self.backend.delete_index() {
            tracing::warn!("Failed to delete existing index: {}", e);
        }
        self.backend.create_index().map_err(|e| {
            UpdateFailure::new(UpdatePhase::Reindex, format!("Failed to recreate index: {e}"))
        })?;

        let entries: Vec<CatalogEntry> = new.into();
        let indexed = index_entries(&self.backend, &entries, self.config.batch_size);
        if indexed == 0 {
            return Err(UpdateFailure::new(
                UpdatePhase::Reindex,
                "Failed to index any documents",
            ));
        }
        Ok(indexed)
    }
}

/// Parse every available chunk file and index the entries into the
/// existing index. Returns the number of documents indexed.
pub fn parse_and_index<B, F>(backend: &B, feed: &F, batch_size: usize) -> Result<usize>
where
    B: SearchBackend + ?Sized,
    F: FeedSource + ?Sized,
{
    let files = feed.chunk_files().context("locating chunk files")?;
    if files.is_empty() {
        return Err(CatalogError::validation(
            "no chunk files found; run download first",
        ));
    }
    let load = load_snapshot(&files);
    let entries: Vec<CatalogEntry> = load.snapshot.into();
    Ok(index_entries(backend, &entries, batch_size))
}
