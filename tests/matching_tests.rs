//! Tool matching integration tests.
//!
//! Drives the matching engine and the batch CSV run against the in-memory
//! backend with scripted search responses.

mod common;

use common::{cpe, entry, hits, FakeBackend};
use cpe_catalog::matching::{match_csv, MatchCsvOptions};
use cpe_catalog::reports::MATCH_SLOTS;
use cpe_catalog::{CatalogSearch, MatchingEngine, Provenance};
use tempfile::TempDir;

fn engine(backend: &FakeBackend) -> MatchingEngine<&FakeBackend> {
    MatchingEngine::new(CatalogSearch::new(backend))
}

// ============================================================================
// Lookup Precedence
// ============================================================================

mod precedence {
    use super::*;

    #[test]
    fn website_match_preempts_name_search() {
        let backend = FakeBackend::default();
        backend.respond(hits(&[
            entry(&cpe("acme", "tool", "1.0")),
            entry(&cpe("acme", "tool", "2.0")),
        ]));
        backend.respond(hits(&[entry(&cpe("other", "product", "1.0"))]));

        let result = engine(&backend).match_tool("Other Product", "https://acme.example/tool/");

        assert!(result.is_match());
        assert_eq!(result.found_by(), Some(Provenance::Website));
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].vendor, "acme");
        assert!(result
            .groups
            .iter()
            .all(|g| g.found_by == Provenance::Website));
        assert_eq!(backend.queries.borrow().len(), 1);
    }

    #[test]
    fn empty_website_result_falls_through_to_name() {
        let backend = FakeBackend::default();
        backend.respond(hits(&[]));
        backend.respond(hits(&[entry(&cpe("acme", "tool", "1.0"))]));

        let result = engine(&backend).match_tool("Acme Tool", "https://github.com/acme/tool/");

        assert_eq!(result.cleaned_website, "github.com/acme/tool");
        assert_eq!(result.found_by(), Some(Provenance::Name));
        assert_eq!(result.groups[0].cpe, cpe("acme", "tool", "1.0"));

        let queries = backend.queries.borrow();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].to_string().contains("*github.com/acme/tool*"));
        assert!(queries[1].to_string().contains("match_phrase"));
    }

    #[test]
    fn website_failure_is_treated_as_no_match() {
        let backend = FakeBackend::default();
        backend.respond_error();
        backend.respond(hits(&[entry(&cpe("acme", "tool", "1.0"))]));

        let result = engine(&backend).match_tool("Acme Tool", "acme.example");
        assert_eq!(result.found_by(), Some(Provenance::Name));
    }

    #[test]
    fn deprecated_only_website_hits_fall_through() {
        let backend = FakeBackend::default();
        backend.respond(hits(&[entry(&cpe("acme", "tool", "1.0")).with_deprecated(true)]));
        backend.respond(hits(&[entry(&cpe("acme", "tool", "2.0"))]));

        let result = engine(&backend).match_tool("Acme Tool", "acme.example");
        assert_eq!(result.found_by(), Some(Provenance::Name));
        assert_eq!(result.groups[0].versions, vec!["2.0"]);
    }

    #[test]
    fn missing_website_goes_straight_to_name_tiers() {
        let backend = FakeBackend::default();
        backend.respond(hits(&[]));
        backend.respond(hits(&[entry(&cpe("acme", "tool", "1.0"))]));

        let result = engine(&backend).match_tool("Acme Tol", "   ");

        assert!(result.cleaned_website.is_empty());
        assert_eq!(result.found_by(), Some(Provenance::Name));
        let queries = backend.queries.borrow();
        assert_eq!(queries.len(), 2);
        assert!(queries[1].to_string().contains("fuzziness"));
    }

    #[test]
    fn nothing_found_is_unmatched() {
        let backend = FakeBackend::default();
        let result = engine(&backend).match_tool("", "");

        assert!(!result.is_match());
        assert_eq!(result.found_by(), None);
        assert!(backend.queries.borrow().is_empty());
    }
}

// ============================================================================
// Batch CSV
// ============================================================================

mod batch {
    use super::*;

    fn read_output(path: &std::path::Path) -> Vec<csv::StringRecord> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .unwrap();
        reader.records().map(Result::unwrap).collect()
    }

    #[test]
    fn match_csv_writes_extended_rows() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("tools.csv");
        std::fs::write(
            &input,
            "id;name;website\n\
             1;Acme Tool;https://acme.example/tool\n\
             2;Beta Widget;\n\
             3;Unknown;\n",
        )
        .unwrap();

        let backend = FakeBackend::with_docs(vec![entry(&cpe("acme", "tool", "1.0"))]);
        backend.respond(hits(&[
            entry(&cpe("acme", "tool", "1.0")),
            entry(&cpe("acme", "tool", "1.1")),
        ]));
        backend.respond(hits(&[entry(&cpe("beta", "widget", "3.0"))]));

        let options = MatchCsvOptions {
            tool_col: 1,
            website_col: 2,
            output: dir.path().join("out").join("matches.csv"),
        };
        let stats = match_csv(&engine(&backend), &input, &options).expect("batch should succeed");

        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.rows_with_matches, 2);
        assert_eq!(stats.rows_without_matches, 1);
        assert_eq!(stats.matches_by_website, 1);
        assert_eq!(stats.matches_by_name, 1);

        let records = read_output(&options.output);
        assert_eq!(records.len(), 4);

        let header = &records[0];
        assert_eq!(header.len(), 3 + 1 + MATCH_SLOTS * 5);
        assert_eq!(&header[3], "cpe_match_count");
        assert_eq!(&header[4], "cpe_1");

        let first = &records[1];
        assert_eq!(&first[1], "Acme Tool");
        assert_eq!(&first[3], "1");
        assert_eq!(&first[4], "cpe:2.3:a:acme:tool:*:*:*:*:*:*:*:*");
        assert_eq!(&first[7], "1.0|1.1");
        assert_eq!(&first[8], "website");
        assert_eq!(&first[9], "");

        let second = &records[2];
        assert_eq!(&second[4], cpe("beta", "widget", "3.0"));
        assert_eq!(&second[8], "name");

        let unmatched = &records[3];
        assert_eq!(&unmatched[3], "0");
        assert!(unmatched.iter().skip(4).all(str::is_empty));
    }

    #[test]
    fn short_rows_keep_added_columns_aligned() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("tools.csv");
        std::fs::write(&input, "id,name,website\n1,Acme Tool\n").unwrap();

        let backend = FakeBackend::with_docs(vec![entry(&cpe("acme", "tool", "1.0"))]);
        backend.respond(hits(&[entry(&cpe("acme", "tool", "1.0"))]));

        let options = MatchCsvOptions {
            tool_col: 1,
            website_col: 2,
            output: dir.path().join("matches.csv"),
        };
        let stats = match_csv(&engine(&backend), &input, &options).expect("batch should succeed");
        assert_eq!(stats.rows_with_matches, 1);

        let records = read_output(&options.output);
        let (header, row) = (&records[0], &records[1]);
        assert_eq!(row.len(), header.len());
        assert_eq!(&row[1], "Acme Tool");
        assert_eq!(&row[2], "");
        assert_eq!(&header[3], "cpe_match_count");
        assert_eq!(&row[3], "1");
        assert_eq!(&header[4], "cpe_1");
        assert_eq!(&row[4], cpe("acme", "tool", "1.0"));
        assert_eq!(&row[8], "name");
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("tools.csv");
        std::fs::write(&input, "id,name,website\n1,Acme,\n").unwrap();

        let backend = FakeBackend::default();
        let options = MatchCsvOptions {
            output: dir.path().join("matches.csv"),
            ..MatchCsvOptions::default()
        };
        let err = match_csv(&engine(&backend), &input, &options).unwrap_err();

        assert!(err.to_string().contains("empty"));
        assert!(!options.output.exists());
    }

    #[test]
    fn missing_input_is_rejected() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::with_docs(vec![entry(&cpe("acme", "tool", "1.0"))]);
        let options = MatchCsvOptions {
            output: dir.path().join("matches.csv"),
            ..MatchCsvOptions::default()
        };

        let result = match_csv(&engine(&backend), &dir.path().join("nope.csv"), &options);
        assert!(result.is_err());
    }
}
