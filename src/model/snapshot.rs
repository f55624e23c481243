//! Snapshot: identifier-keyed collection of catalog entries.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::entry::CatalogEntry;

/// Full set of catalog entries at one point in time, keyed by `cpeName`.
///
/// Insertion order is retained for stable report output, but comparisons
/// only ever use the key set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CatalogEntry>", into = "Vec<CatalogEntry>")]
pub struct Snapshot {
    entries: IndexMap<String, CatalogEntry>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot, dropping nameless entries. A repeated name keeps
    /// the last occurrence.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut snapshot = Self::new();
        snapshot.extend(entries);
        snapshot
    }

    /// Insert one entry. Returns false when the entry was rejected.
    pub fn insert(&mut self, entry: CatalogEntry) -> bool {
        if entry.cpe_name.trim().is_empty() {
            tracing::warn!("Skipping entry without cpeName (id {:?})", entry.cpe_name_id);
            return false;
        }
        if let Some(previous) = self.entries.insert(entry.cpe_name.clone(), entry) {
            tracing::debug!("Duplicate cpeName {}, keeping last", previous.cpe_name);
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Entries as a contiguous vector, in insertion order.
    pub fn to_vec(&self) -> Vec<CatalogEntry> {
        self.entries.values().cloned().collect()
    }
}

impl Extend<CatalogEntry> for Snapshot {
    fn extend<T: IntoIterator<Item = CatalogEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl FromIterator<CatalogEntry> for Snapshot {
    fn from_iter<T: IntoIterator<Item = CatalogEntry>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

impl From<Vec<CatalogEntry>> for Snapshot {
    fn from(entries: Vec<CatalogEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<Snapshot> for Vec<CatalogEntry> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.entries.into_values().collect()
    }
}

impl IntoIterator for Snapshot {
    type Item = CatalogEntry;
    type IntoIter = indexmap::map::IntoValues<String, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}
