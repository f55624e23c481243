//! Feed chunk mapper.
//!
//! Turns NVD CPE 2.0 chunk files into [`CatalogEntry`] records. The same
//! mapping feeds indexing and the "new" side of an update diff, so both
//! agree on date formats and list contents.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, ErrorContext, OptionContext, ParseErrorKind, Result};
use crate::model::{CatalogEntry, Reference, Snapshot, Title};

/// Value of the top-level `format` field of a chunk file.
pub const FEED_FORMAT: &str = "NVD_CPE";

/// Rendering of timestamps without an offset.
const NAIVE_OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

const NAIVE_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Deserialize)]
struct ChunkDocument {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    products: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCpe {
    #[serde(default)]
    cpe_name: Option<String>,
    #[serde(default)]
    cpe_name_id: Option<String>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    last_modified: Option<String>,
    #[serde(default)]
    deprecated: Option<bool>,
    #[serde(default)]
    refs: Vec<RawRef>,
    #[serde(default)]
    titles: Vec<RawTitle>,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    #[serde(rename = "ref", default)]
    url: Option<String>,
    #[serde(rename = "type", default)]
    ref_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTitle {
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Entries parsed from one chunk file.
#[derive(Debug, Clone, Default)]
pub struct ChunkParse {
    pub entries: Vec<CatalogEntry>,
    /// Products that could not be mapped
    pub skipped: usize,
}

/// Normalize a feed timestamp to ISO-8601.
///
/// Timestamps with an offset keep it; naive timestamps are rendered with
/// millisecond precision; a bare date becomes midnight. Empty input is
/// `None`, unparseable input is `None` with a warning.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string());
    }
    for format in NAIVE_INPUT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.format(NAIVE_OUTPUT_FORMAT).to_string());
        }
    }
    if let Some(dt) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Some(dt.format(NAIVE_OUTPUT_FORMAT).to_string());
    }
    tracing::warn!("Failed to parse date {}", raw);
    None
}

/// Map one product object to an entry. `position` names the product in
/// error messages.
fn map_product(product: Value, position: &str) -> Result<CatalogEntry> {
    let cpe = product
        .get("cpe")
        .cloned()
        .with_context_none(|| format!("{position} has no cpe object"))?;
    let raw: RawCpe = serde_json::from_value(cpe).context(position)?;

    let cpe_name = raw
        .cpe_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| CatalogError::missing_field("cpeName", position))?;

    Ok(CatalogEntry {
        cpe_name,
        cpe_name_id: raw.cpe_name_id.unwrap_or_default(),
        created: raw.created.as_deref().and_then(normalize_date),
        last_modified: raw.last_modified.as_deref().and_then(normalize_date),
        deprecated: raw.deprecated.unwrap_or(false),
        titles: raw
            .titles
            .into_iter()
            .filter_map(|t| {
                let title = t.title.filter(|s| !s.is_empty())?;
                Some(Title {
                    lang: t.lang,
                    title,
                })
            })
            .collect(),
        refs: raw
            .refs
            .into_iter()
            .filter_map(|r| {
                let url = r.url.filter(|s| !s.is_empty())?;
                Some(Reference {
                    url,
                    ref_type: r.ref_type,
                })
            })
            .collect(),
    })
}

/// Parse one chunk file.
///
/// Fails when the file cannot be read, is not JSON, or carries a `format`
/// other than [`FEED_FORMAT`]. Individual products that cannot be mapped
/// are logged and counted in [`ChunkParse::skipped`].
pub fn parse_chunk_file(path: &Path) -> Result<ChunkParse> {
    let content = std::fs::read(path).map_err(|e| CatalogError::io(path, e))?;
    let document: ChunkDocument = serde_json::from_slice(&content).map_err(|e| {
        CatalogError::parse(
            format!("reading {}", path.display()),
            ParseErrorKind::InvalidJson(e.to_string()),
        )
    })?;

    let format = document.format.unwrap_or_default();
    if format != FEED_FORMAT {
        return Err(CatalogError::parse(
            format!("reading {}", path.display()),
            ParseErrorKind::UnexpectedFormat(format),
        ));
    }

    let file_name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );
    tracing::info!("Found {} products in {}", document.products.len(), file_name);

    let mut parsed = ChunkParse::default();
    for (idx, product) in document.products.into_iter().enumerate() {
        match map_product(product, &format!("product {idx} in {file_name}")) {
            Ok(entry) => parsed.entries.push(entry),
            Err(err) => {
                match std::error::Error::source(&err) {
                    Some(cause) => tracing::warn!("Skipping product: {} ({})", err, cause),
                    None => tracing::warn!("Skipping product: {}", err),
                }
                parsed.skipped += 1;
            }
        }
    }
    Ok(parsed)
}

/// Outcome of loading a set of chunk files.
#[derive(Debug, Clone, Default)]
pub struct SnapshotLoad {
    pub snapshot: Snapshot,
    pub files_parsed: usize,
    /// Files that could not be parsed at all
    pub failed_files: Vec<PathBuf>,
    pub records_skipped: usize,
}

/// Parse every chunk file into one snapshot, skipping bad files and records.
pub fn load_snapshot(files: &[PathBuf]) -> SnapshotLoad {
    let mut load = SnapshotLoad::default();
    for file in files {
        match parse_chunk_file(file) {
            Ok(chunk) => {
                load.files_parsed += 1;
                load.records_skipped += chunk.skipped;
                load.snapshot.extend(chunk.entries);
            }
            Err(e) => {
                tracing::error!("Failed to parse {}: {}", file.display(), e);
                load.failed_files.push(file.clone());
            }
        }
    }
    tracing::info!(
        "Loaded {} entries from {} files ({} files failed, {} records skipped)",
        load.snapshot.len(),
        load.files_parsed,
        load.failed_files.len(),
        load.records_skipped
    );
    load
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_chunk(dir: &Path, name: &str, body: &Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_vec(body).unwrap()).unwrap();
        path
    }

    fn product(name: &str) -> Value {
        json!({ "cpe": {
            "cpeName": name,
            "cpeNameId": "87316812-5F2C-4286-94FE-CC98B9EAEF53",
            "created": "2007-08-23T21:05:57.937",
            "lastModified": "2007-09-14T17:36:49.090",
            "deprecated": false,
            "titles": [{ "title": "Acme Tool", "lang": "en" }, { "lang": "de" }],
            "refs": [{ "ref": "https://acme.example", "type": "Vendor" }, { "type": "Product" }]
        }})
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(
            normalize_date("2007-08-23T21:05:57.937").as_deref(),
            Some("2007-08-23T21:05:57.937")
        );
        assert_eq!(
            normalize_date("2007-08-23T21:05:57").as_deref(),
            Some("2007-08-23T21:05:57.000")
        );
        assert_eq!(
            normalize_date("2024-03-01T10:00:00.5+02:00").as_deref(),
            Some("2024-03-01T10:00:00.500+02:00")
        );
        assert_eq!(
            normalize_date("2024-03-01").as_deref(),
            Some("2024-03-01T00:00:00.000")
        );
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("yesterday"), None);
    }

    #[test]
    fn test_normalized_dates_are_stable() {
        for raw in ["2007-08-23T21:05:57.937", "2024-03-01T10:00:00+02:00"] {
            let once = normalize_date(raw).unwrap();
            assert_eq!(normalize_date(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_parse_chunk_maps_products() {
        let tmp = TempDir::new().unwrap();
        let path = write_chunk(
            tmp.path(),
            "nvdcpe-2.0-chunk-00000.json",
            &json!({
                "format": "NVD_CPE",
                "products": [
                    product("cpe:2.3:a:acme:tool:1.0:*:*:*:*:*:*:*"),
                    { "cpe": { "cpeNameId": "no-name" } },
                    { "other": true }
                ]
            }),
        );

        let parsed = parse_chunk_file(&path).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.skipped, 2);

        let entry = &parsed.entries[0];
        assert_eq!(entry.titles.len(), 1);
        assert_eq!(entry.refs.len(), 1);
        assert_eq!(entry.created.as_deref(), Some("2007-08-23T21:05:57.937"));
        assert_eq!(entry.last_modified.as_deref(), Some("2007-09-14T17:36:49.090"));
    }

    #[test]
    fn test_unmappable_products_name_the_problem() {
        let err = map_product(json!({ "cpe": { "cpeNameId": "x" } }), "product 1 in c.json")
            .unwrap_err();
        match err {
            CatalogError::Parse {
                source: ParseErrorKind::MissingField { field, context },
                ..
            } => {
                assert_eq!(field, "cpeName");
                assert_eq!(context, "product 1 in c.json");
            }
            other => panic!("expected missing field, got {other:?}"),
        }

        let err = map_product(json!({ "other": true }), "product 2 in c.json").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: product 2 in c.json has no cpe object"
        );

        let err = map_product(json!({ "cpe": { "titles": 7 } }), "product 3 in c.json")
            .unwrap_err();
        assert!(err.to_string().contains("product 3 in c.json"));
    }

    #[test]
    fn test_unexpected_format_rejects_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_chunk(
            tmp.path(),
            "chunk.json",
            &json!({ "format": "NVD_CVE", "products": [product("cpe:2.3:a:x:y:1")] }),
        );
        match parse_chunk_file(&path) {
            Err(CatalogError::Parse {
                source: ParseErrorKind::UnexpectedFormat(format),
                ..
            }) => assert_eq!(format, "NVD_CVE"),
            other => panic!("Expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_snapshot_skips_bad_files() {
        let tmp = TempDir::new().unwrap();
        let good = write_chunk(
            tmp.path(),
            "a.json",
            &json!({ "format": "NVD_CPE", "products": [
                product("cpe:2.3:a:acme:tool:1.0"),
                product("cpe:2.3:a:acme:tool:2.0")
            ]}),
        );
        let bad = tmp.path().join("b.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let missing = tmp.path().join("c.json");

        let load = load_snapshot(&[good, bad.clone(), missing]);
        assert_eq!(load.snapshot.len(), 2);
        assert_eq!(load.files_parsed, 1);
        assert_eq!(load.failed_files.len(), 2);
        assert_eq!(load.failed_files[0], bad);
    }
}
