//! Snapshot diff engine implementation.

use super::result::{ChangeReport, DiffResult, FieldChanges, ModifiedEntry, UpdateCounters};
use crate::model::Snapshot;

/// Diff engine for comparing two catalog snapshots.
///
/// Entries are matched by `cpeName` only. Results are ordered by identifier
/// so the report does not depend on snapshot insertion order.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    include_unchanged: bool,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    /// Create a new diff engine with default settings
    pub const fn new() -> Self {
        Self {
            include_unchanged: true,
        }
    }

    /// Whether unchanged entries are listed in the report. They are always
    /// counted.
    #[must_use]
    pub const fn include_unchanged(mut self, include: bool) -> Self {
        self.include_unchanged = include;
        self
    }

    /// Compare `old` against `new`.
    pub fn diff(&self, old: &Snapshot, new: &Snapshot) -> DiffResult {
        let mut changes = ChangeReport::default();
        let mut stats = UpdateCounters {
            total_old: old.len(),
            total_new: new.len(),
            ..UpdateCounters::default()
        };

        let mut new_names: Vec<&str> = new.names().collect();
        new_names.sort_unstable();

        for name in new_names {
            let Some(new_entry) = new.get(name) else {
                continue;
            };
            let Some(old_entry) = old.get(name) else {
                changes.added.push(new_entry.clone());
                stats.added += 1;
                continue;
            };

            if !old_entry.tracked_fields_differ(new_entry) {
                if self.include_unchanged {
                    changes.unchanged.push(new_entry.clone());
                }
                stats.unchanged += 1;
                continue;
            }

            let modified = ModifiedEntry {
                cpe_name: name.to_string(),
                old: old_entry.clone(),
                new: new_entry.clone(),
                changes: FieldChanges::between(old_entry, new_entry),
            };
            if modified.is_deprecation() {
                changes.deprecated_transitions.push(new_entry.clone());
                stats.deprecated_transitions += 1;
            }
            changes.modified.push(modified);
            stats.modified += 1;
        }

        let mut removed_names: Vec<&str> = old.names().filter(|n| !new.contains(n)).collect();
        removed_names.sort_unstable();
        for name in removed_names {
            if let Some(entry) = old.get(name) {
                changes.removed.push(entry.clone());
                stats.removed += 1;
            }
        }

        tracing::debug!(
            "Diff computed: {} added, {} removed, {} modified ({} newly deprecated), {} unchanged",
            stats.added,
            stats.removed,
            stats.modified,
            stats.deprecated_transitions,
            stats.unchanged
        );

        DiffResult {
            changes,
            statistics: stats,
        }
    }
}
