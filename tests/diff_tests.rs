//! Snapshot diff integration tests.
//!
//! Exercises the diff engine through the public API together with the JSON
//! and CSV report writers that persist its output.

mod common;

use common::{cpe, entry};
use cpe_catalog::reports::{DiffCsvReporter, JsonDiffReporter};
use cpe_catalog::{CatalogEntry, DiffEngine, Snapshot};

// ============================================================================
// Classification
// ============================================================================

mod classification {
    use super::*;

    #[test]
    fn deprecation_flip_is_modified_and_transition() {
        let name = "cpe:2.3:a:acme:tool:1.0:*:*:*:*:*:*:*";
        let old = Snapshot::from_entries(vec![entry(name)]);
        let new = Snapshot::from_entries(vec![entry(name).with_deprecated(true)]);

        let result = DiffEngine::new().diff(&old, &new);

        assert_eq!(result.changes.modified.len(), 1);
        assert_eq!(result.changes.deprecated_transitions.len(), 1);
        assert!(result.changes.unchanged.is_empty());
        assert_eq!(result.statistics.modified, 1);
        assert_eq!(result.statistics.deprecated_transitions, 1);
        assert_eq!(result.statistics.unchanged, 0);

        let modified = &result.changes.modified[0];
        assert_eq!(modified.cpe_name, name);
        assert_eq!(modified.changes.changed_fields(), vec!["deprecated"]);
    }

    #[test]
    fn undeprecation_is_modified_only() {
        let name = cpe("acme", "tool", "1.0");
        let old = Snapshot::from_entries(vec![entry(&name).with_deprecated(true)]);
        let new = Snapshot::from_entries(vec![entry(&name)]);

        let result = DiffEngine::new().diff(&old, &new);
        assert_eq!(result.statistics.modified, 1);
        assert_eq!(result.statistics.deprecated_transitions, 0);
    }

    #[test]
    fn each_tracked_field_triggers_modified() {
        let name = cpe("acme", "tool", "1.0");
        let base = entry(&name);
        let variants: Vec<(&str, CatalogEntry)> = vec![
            (
                "lastModified",
                base.clone().with_last_modified("2025-02-02T00:00:00.000"),
            ),
            ("deprecated", base.clone().with_deprecated(true)),
            ("titles", base.clone().with_title("de", "Werkzeug")),
            ("refs", base.clone().with_ref("https://acme.example", "Vendor")),
        ];

        for (field, changed) in variants {
            let old = Snapshot::from_entries(vec![base.clone()]);
            let new = Snapshot::from_entries(vec![changed]);
            let result = DiffEngine::new().diff(&old, &new);
            assert_eq!(result.statistics.modified, 1, "field {field}");
            assert_eq!(
                result.changes.modified[0].changes.changed_fields(),
                vec![field]
            );
        }
    }

    #[test]
    fn untracked_fields_do_not_count() {
        let name = cpe("acme", "tool", "1.0");
        let mut changed = entry(&name).with_id("NEW-ID");
        changed.created = Some("2001-01-01T00:00:00.000".to_string());

        let old = Snapshot::from_entries(vec![entry(&name)]);
        let new = Snapshot::from_entries(vec![changed]);
        let result = DiffEngine::new().diff(&old, &new);

        assert_eq!(result.statistics.unchanged, 1);
        assert_eq!(result.statistics.modified, 0);
    }

    #[test]
    fn title_order_matters() {
        let name = cpe("acme", "tool", "1.0");
        let old = CatalogEntry::new(&name)
            .with_title("en", "Tool")
            .with_title("de", "Werkzeug");
        let new = CatalogEntry::new(&name)
            .with_title("de", "Werkzeug")
            .with_title("en", "Tool");

        let result = DiffEngine::new().diff(
            &Snapshot::from_entries(vec![old]),
            &Snapshot::from_entries(vec![new]),
        );
        assert_eq!(result.statistics.modified, 1);
    }

    #[test]
    fn added_and_removed_are_disjoint() {
        let old = Snapshot::from_entries(vec![
            entry(&cpe("acme", "old", "1")),
            entry(&cpe("acme", "kept", "1")),
        ]);
        let new = Snapshot::from_entries(vec![
            entry(&cpe("acme", "kept", "1")),
            entry(&cpe("acme", "new", "1")),
        ]);

        let result = DiffEngine::new().diff(&old, &new);
        let stats = result.statistics;

        assert_eq!(stats.total_old, 2);
        assert_eq!(stats.total_new, 2);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.unchanged, 1);
        assert_eq!(result.changes.added[0].cpe_name, cpe("acme", "new", "1"));
        assert_eq!(result.changes.removed[0].cpe_name, cpe("acme", "old", "1"));
    }

    #[test]
    fn empty_old_marks_everything_added() {
        let new = Snapshot::from_entries(vec![
            entry(&cpe("acme", "a", "1")),
            entry(&cpe("acme", "b", "1")),
        ]);
        let result = DiffEngine::new().diff(&Snapshot::new(), &new);

        assert_eq!(result.statistics.added, 2);
        assert_eq!(result.statistics.removed, 0);
        assert!(result.has_changes());
    }

    #[test]
    fn insertion_order_does_not_change_result() {
        let a = entry(&cpe("acme", "a", "1"));
        let b = entry(&cpe("acme", "b", "1")).with_deprecated(true);
        let c = entry(&cpe("acme", "c", "1"));

        let old_forward = Snapshot::from_entries(vec![a.clone(), b.clone()]);
        let old_reverse = Snapshot::from_entries(vec![b.clone(), a.clone()]);
        let new_forward = Snapshot::from_entries(vec![b.clone(), c.clone()]);
        let new_reverse = Snapshot::from_entries(vec![c, b]);

        let engine = DiffEngine::new();
        assert_eq!(
            engine.diff(&old_forward, &new_forward),
            engine.diff(&old_reverse, &new_reverse)
        );
    }

    #[test]
    fn unchanged_listing_can_be_suppressed() {
        let snapshot = Snapshot::from_entries(vec![entry(&cpe("acme", "a", "1"))]);
        let result = DiffEngine::new()
            .include_unchanged(false)
            .diff(&snapshot, &snapshot);

        assert_eq!(result.statistics.unchanged, 1);
        assert!(result.changes.unchanged.is_empty());
        assert!(!result.has_changes());
    }
}

// ============================================================================
// Report Writers
// ============================================================================

mod reports {
    use super::*;
    use serde_json::Value;

    fn sample_diff() -> cpe_catalog::DiffResult {
        let kept = cpe("acme", "tool", "1.0");
        let old = Snapshot::from_entries(vec![
            entry(&kept),
            entry(&cpe("acme", "gone", "1.0")),
        ]);
        let new = Snapshot::from_entries(vec![
            entry(&kept)
                .with_deprecated(true)
                .with_ref("https://acme.example", "Vendor")
                .with_ref("https://acme.example/tool", "Product"),
            entry(&cpe("beta", "widget", "2.0")),
        ]);
        DiffEngine::new().diff(&old, &new)
    }

    #[test]
    fn json_report_has_timestamp_statistics_and_changes() {
        let json = JsonDiffReporter::new()
            .generate(&sample_diff(), "20240101_120000")
            .expect("json report should render");
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["timestamp"], "20240101_120000");
        assert_eq!(value["statistics"]["added"], 1);
        assert_eq!(value["statistics"]["removed"], 1);
        assert_eq!(value["statistics"]["modified"], 1);
        assert_eq!(value["statistics"]["deprecated"], 1);
        assert_eq!(value["changes"]["added"][0]["cpeName"], cpe("beta", "widget", "2.0"));
        assert_eq!(value["changes"]["deprecated"].as_array().unwrap().len(), 1);
        assert_eq!(value["changes"]["removed"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn csv_summary_lists_added_modified_and_deprecated() {
        let csv = DiffCsvReporter::new()
            .generate(&sample_diff())
            .expect("csv summary should render");
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("Change Type,"));
        assert!(header.ends_with("Deprecated"));

        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("ADDED,cpe:2.3:a:beta:widget:2.0"));
        assert!(rows[1].starts_with("MODIFIED,cpe:2.3:a:acme:tool:1.0"));
        assert!(rows[2].starts_with("DEPRECATED,cpe:2.3:a:acme:tool:1.0"));
        assert!(rows[1].contains("https://acme.example; https://acme.example/tool"));
        assert!(rows[2].ends_with("True"));
        assert!(!csv.contains("gone"));
    }
}
