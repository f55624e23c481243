//! Diff result structures.

use crate::model::{CatalogEntry, Reference, Title};
use serde::{Deserialize, Serialize};

/// Complete result of a snapshot diff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct DiffResult {
    /// Per-category change lists
    pub changes: ChangeReport,
    /// Counters accumulated while building `changes`
    pub statistics: UpdateCounters,
}

impl DiffResult {
    /// Create a new empty diff result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.statistics.added > 0 || self.statistics.removed > 0 || self.statistics.modified > 0
    }
}

/// Partition of `old ∪ new` by change category.
///
/// `deprecated` is a subset of `modified`: entries whose `deprecated` flag
/// flipped from false to true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub added: Vec<CatalogEntry>,
    pub modified: Vec<ModifiedEntry>,
    #[serde(rename = "deprecated")]
    pub deprecated_transitions: Vec<CatalogEntry>,
    pub removed: Vec<CatalogEntry>,
    /// Empty when the engine was told not to include unchanged entries
    #[serde(default)]
    pub unchanged: Vec<CatalogEntry>,
}

/// An entry present in both snapshots with at least one tracked field changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedEntry {
    pub cpe_name: String,
    pub old: CatalogEntry,
    pub new: CatalogEntry,
    pub changes: FieldChanges,
}

impl ModifiedEntry {
    /// True when `deprecated` went from false to true.
    pub fn is_deprecation(&self) -> bool {
        !self.old.deprecated && self.new.deprecated
    }
}

/// Old and new value of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDelta<T> {
    pub old: T,
    pub new: T,
}

impl<T: PartialEq + Clone> FieldDelta<T> {
    /// Delta for `old`/`new` when they differ.
    pub fn between(old: &T, new: &T) -> Option<Self> {
        (old != new).then(|| Self {
            old: old.clone(),
            new: new.clone(),
        })
    }
}

/// Field-level differences of a modified entry. Unchanged fields are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<FieldDelta<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<FieldDelta<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titles: Option<FieldDelta<Vec<Title>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<FieldDelta<Vec<Reference>>>,
}

impl FieldChanges {
    /// Compare the tracked fields of two entries.
    pub fn between(old: &CatalogEntry, new: &CatalogEntry) -> Self {
        Self {
            last_modified: FieldDelta::between(&old.last_modified, &new.last_modified),
            deprecated: FieldDelta::between(&old.deprecated, &new.deprecated),
            titles: FieldDelta::between(&old.titles, &new.titles),
            refs: FieldDelta::between(&old.refs, &new.refs),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_modified.is_none()
            && self.deprecated.is_none()
            && self.titles.is_none()
            && self.refs.is_none()
    }

    /// Names of the changed fields, in a fixed order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.last_modified.is_some() {
            fields.push("lastModified");
        }
        if self.deprecated.is_some() {
            fields.push("deprecated");
        }
        if self.titles.is_some() {
            fields.push("titles");
        }
        if self.refs.is_some() {
            fields.push("refs");
        }
        fields
    }
}

/// Summary counters of a diff run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCounters {
    pub total_old: usize,
    pub total_new: usize,
    pub added: usize,
    pub modified: usize,
    /// Newly deprecated entries (subset of `modified`)
    #[serde(rename = "deprecated", alias = "deprecated_transitions")]
    pub deprecated_transitions: usize,
    pub unchanged: usize,
    #[serde(default)]
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_changes_only_lists_differences() {
        let old = CatalogEntry::new("cpe:2.3:a:x:y:1").with_last_modified("2024-01-01");
        let new = old.clone().with_deprecated(true);
        let changes = FieldChanges::between(&old, &new);

        assert_eq!(changes.changed_fields(), vec!["deprecated"]);
        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(json["deprecated"]["old"], false);
        assert_eq!(json["deprecated"]["new"], true);
        assert!(json.get("lastModified").is_none());
    }

    #[test]
    fn test_counters_serialize_deprecated_key() {
        let counters = UpdateCounters {
            deprecated_transitions: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(counters).unwrap();
        assert_eq!(json["deprecated"], 3);
        assert_eq!(json["total_old"], 0);
    }
}
