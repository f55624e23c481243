//! Property-based tests for diffing, grouping and website normalization.
//!
//! Checks that the change report partitions the key space for arbitrary
//! snapshots and that grouping and normalization are stable.

use cpe_catalog::matching::group_hits;
use cpe_catalog::search::normalize_website;
use cpe_catalog::{CatalogEntry, DiffEngine, Provenance, Snapshot};
use proptest::prelude::*;
use std::collections::HashSet;

const VENDORS: &[&str] = &["acme", "beta", "gamma"];
const PRODUCTS: &[&str] = &["tool", "widget"];
const VERSIONS: &[&str] = &["1.0", "1.1", "2.0", "*"];

fn entry_strategy() -> impl Strategy<Value = CatalogEntry> {
    (
        0..VENDORS.len(),
        0..PRODUCTS.len(),
        0..VERSIONS.len(),
        0u8..3,
        any::<bool>(),
        prop::option::of("[a-z]{1,8}"),
    )
        .prop_map(|(v, p, ver, stamp, deprecated, title)| {
            let name = format!(
                "cpe:2.3:a:{}:{}:{}:*:*:*:*:*:*:*",
                VENDORS[v], PRODUCTS[p], VERSIONS[ver]
            );
            let mut entry = CatalogEntry::new(name)
                .with_last_modified(format!("2024-01-0{}T00:00:00.000", stamp + 1))
                .with_deprecated(deprecated);
            if let Some(title) = title {
                entry = entry.with_title("en", title);
            }
            entry
        })
}

fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec(entry_strategy(), 0..30).prop_map(Snapshot::from_entries)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn diff_partitions_key_space(old in snapshot_strategy(), new in snapshot_strategy()) {
        let result = DiffEngine::new().diff(&old, &new);
        let stats = result.statistics;

        let old_keys: HashSet<&str> = old.names().collect();
        let new_keys: HashSet<&str> = new.names().collect();

        prop_assert_eq!(stats.added + stats.modified + stats.unchanged, new.len());
        prop_assert_eq!(stats.removed, old_keys.difference(&new_keys).count());
        prop_assert_eq!(stats.added, new_keys.difference(&old_keys).count());
        prop_assert_eq!(stats.total_old, old.len());
        prop_assert_eq!(stats.total_new, new.len());
    }

    #[test]
    fn counters_match_report(old in snapshot_strategy(), new in snapshot_strategy()) {
        let result = DiffEngine::new().diff(&old, &new);
        let changes = &result.changes;
        let stats = result.statistics;

        prop_assert_eq!(changes.added.len(), stats.added);
        prop_assert_eq!(changes.removed.len(), stats.removed);
        prop_assert_eq!(changes.modified.len(), stats.modified);
        prop_assert_eq!(changes.unchanged.len(), stats.unchanged);
        prop_assert_eq!(changes.deprecated_transitions.len(), stats.deprecated_transitions);
    }

    #[test]
    fn transitions_are_modified_flips(old in snapshot_strategy(), new in snapshot_strategy()) {
        let result = DiffEngine::new().diff(&old, &new);
        let modified: HashSet<&str> = result
            .changes
            .modified
            .iter()
            .map(|m| m.cpe_name.as_str())
            .collect();

        for entry in &result.changes.deprecated_transitions {
            prop_assert!(modified.contains(entry.cpe_name.as_str()));
            prop_assert!(entry.deprecated);
            let previous = old.get(&entry.cpe_name);
            prop_assert!(previous.is_some_and(|p| !p.deprecated));
        }
    }

    #[test]
    fn self_diff_is_all_unchanged(snapshot in snapshot_strategy()) {
        let result = DiffEngine::new().diff(&snapshot, &snapshot);
        prop_assert_eq!(result.statistics.unchanged, snapshot.len());
        prop_assert!(!result.has_changes());
        prop_assert!(result.changes.added.is_empty());
        prop_assert!(result.changes.removed.is_empty());
        prop_assert!(result.changes.modified.is_empty());
    }

    #[test]
    fn regrouping_keeps_group_count(hits in prop::collection::vec(entry_strategy(), 0..40)) {
        let groups = group_hits(&hits, Provenance::Name);
        let representatives: Vec<CatalogEntry> =
            groups.iter().map(|g| g.representative_entry()).collect();
        let regrouped = group_hits(&representatives, Provenance::Name);

        prop_assert_eq!(regrouped.len(), groups.len());
        for group in &groups {
            prop_assert!(!group.versions.is_empty());
            let mut sorted = group.versions.clone();
            sorted.sort();
            prop_assert_eq!(&sorted, &group.versions);
        }
    }

    #[test]
    fn normalize_website_is_idempotent(
        scheme in prop::sample::select(vec!["", "http://", "https://", "HTTPS://"]),
        host in "[a-z]{1,10}(\\.[a-z]{2,5}){1,2}",
        path in prop::collection::vec("[a-z0-9_-]{1,8}", 0..4),
        trailing_slash in any::<bool>(),
        query in prop::option::of("[a-z]{1,5}=[a-z0-9]{1,5}"),
    ) {
        let mut url = format!("{scheme}{host}");
        for segment in &path {
            url.push('/');
            url.push_str(segment);
        }
        if trailing_slash {
            url.push('/');
        }
        if let Some(query) = query {
            url.push('?');
            url.push_str(&query);
        }

        let once = normalize_website(&url);
        prop_assert!(!once.contains("://"));
        prop_assert!(!once.ends_with('/'));
        prop_assert!(!once.contains('?'));
        prop_assert_eq!(normalize_website(&once), once);
    }

    #[test]
    fn normalize_website_doesnt_panic(s in "\\PC{0,120}") {
        let _ = normalize_website(&s);
    }
}
