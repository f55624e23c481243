//! Batch matching of a tool inventory CSV.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::engine::{MatchingEngine, ToolMatch};
use crate::backend::SearchBackend;
use crate::error::{CatalogError, ErrorContext, Result};
use crate::model::Provenance;
use crate::reports::write_match_csv;

/// Lines inspected when guessing the delimiter.
const SNIFF_LINES: usize = 10;

/// Column layout and destination of a batch run.
#[derive(Debug, Clone)]
pub struct MatchCsvOptions {
    /// 0-based column holding the tool name
    pub tool_col: usize,
    /// 0-based column holding the website
    pub website_col: usize,
    pub output: PathBuf,
}

impl Default for MatchCsvOptions {
    fn default() -> Self {
        Self {
            tool_col: 1,
            website_col: 2,
            output: PathBuf::from("cpe_matches.csv"),
        }
    }
}

/// Counters over a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub total_rows: usize,
    pub rows_with_matches: usize,
    pub rows_without_matches: usize,
    pub total_matches: usize,
    pub matches_by_name: usize,
    pub matches_by_website: usize,
}

impl MatchStats {
    pub fn record(&mut self, result: &ToolMatch) {
        self.total_rows += 1;
        if !result.is_match() {
            self.rows_without_matches += 1;
            return;
        }
        self.rows_with_matches += 1;
        self.total_matches += result.groups.len();
        for group in &result.groups {
            match group.found_by {
                Provenance::Name => self.matches_by_name += 1,
                Provenance::Website => self.matches_by_website += 1,
            }
        }
    }

    /// Share of rows with at least one match, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        self.rows_with_matches as f64 / self.total_rows as f64 * 100.0
    }
}

/// One input row with its matches.
#[derive(Debug, Clone)]
pub struct MatchedRow {
    /// 1-based data row number (header excluded)
    pub row_number: usize,
    pub original: Vec<String>,
    pub result: ToolMatch,
}

/// Parsed input CSV.
#[derive(Debug, Clone, Default)]
pub struct CsvInput {
    pub delimiter: u8,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvInput {
    /// Read a CSV file with an auto-detected delimiter. The first record is
    /// the header; ragged rows are accepted.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| CatalogError::io(path, e))?;
        let content = String::from_utf8_lossy(&bytes);
        Self::parse(&content).with_context(|| format!("reading {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let delimiter = sniff_delimiter(content);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = reader.records();
        let header = match records.next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => Vec::new(),
        };
        let mut rows = Vec::new();
        for record in records {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self {
            delimiter,
            header,
            rows,
        })
    }
}

/// Guess the delimiter among tab, semicolon, comma and pipe.
///
/// Each candidate is scored by how many sample lines split into the same
/// number of fields as the first line, times that field count. Comma wins
/// when nothing splits the first line.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(SNIFF_LINES).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map_or(1, |r| r.len())
            })
            .collect();

        let target = counts[0];
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", |s| s.trim())
}

/// Match every row of `input` and write the extended CSV to
/// `options.output`.
///
/// Fails when the input is missing or the catalog holds no documents; a
/// lookup failure on a single row only leaves that row unmatched.
pub fn match_csv<B: SearchBackend>(
    engine: &MatchingEngine<B>,
    input: &Path,
    options: &MatchCsvOptions,
) -> Result<MatchStats> {
    if !input.exists() {
        return Err(CatalogError::validation(format!(
            "CSV file not found: {}",
            input.display()
        )));
    }

    let doc_count = engine
        .search()
        .backend()
        .document_count()
        .context("checking catalog size")?;
    if doc_count == 0 {
        return Err(CatalogError::validation(
            "catalog is empty; run parse-and-index first",
        ));
    }

    tracing::info!("Processing CSV file: {}", input.display());
    tracing::info!("CPE catalog contains {} documents", doc_count);

    let csv_input = CsvInput::read(input)?;
    let mut stats = MatchStats::default();
    let mut matched = Vec::with_capacity(csv_input.rows.len());

    for (idx, row) in csv_input.rows.into_iter().enumerate() {
        let tool_name = cell(&row, options.tool_col);
        let website = cell(&row, options.website_col);
        tracing::info!("Processing row {}: {}", idx + 1, tool_name);

        let result = engine.match_tool(tool_name, website);
        stats.record(&result);
        matched.push(MatchedRow {
            row_number: idx + 1,
            original: row,
            result,
        });
    }

    write_match_csv(&options.output, &csv_input.header, &matched)
        .with_context(|| format!("writing {}", options.output.display()))?;
    tracing::info!("Results written to: {}", options.output.display());

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogEntry, MatchGroup};

    fn group(found_by: Provenance) -> MatchGroup {
        MatchGroup {
            vendor: "acme".to_string(),
            product: "tool".to_string(),
            cpe: "cpe:2.3:a:acme:tool:1.0".to_string(),
            versions: vec!["1.0".to_string()],
            cpe_names: vec!["cpe:2.3:a:acme:tool:1.0".to_string()],
            sample: CatalogEntry::new("cpe:2.3:a:acme:tool:1.0"),
            found_by,
        }
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("id,name,site\n1,a,b\n"), b',');
        assert_eq!(sniff_delimiter("id;name;site\n1;a;b\n"), b';');
        assert_eq!(sniff_delimiter("id\tname\tsite\n1\ta\tb\n"), b'\t');
        assert_eq!(sniff_delimiter("id|name|site\n1|a|b\n"), b'|');
        assert_eq!(sniff_delimiter("single\nvalue\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_quoted_commas_do_not_confuse_semicolon_files() {
        let content = "id;name;site\n1;\"Tool, Inc\";https://a.example\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_parse_ragged_rows() {
        let input = CsvInput::parse("id,name,site\n1,Acme Tool\n2,Other,https://o.example\n")
            .unwrap();
        assert_eq!(input.header, vec!["id", "name", "site"]);
        assert_eq!(input.rows.len(), 2);
        assert_eq!(cell(&input.rows[0], 2), "");
        assert_eq!(cell(&input.rows[1], 2), "https://o.example");
    }

    #[test]
    fn test_stats_record_and_rate() {
        let mut stats = MatchStats::default();
        assert_eq!(stats.success_rate(), 0.0);

        stats.record(&ToolMatch {
            groups: vec![group(Provenance::Website), group(Provenance::Website)],
            ..Default::default()
        });
        stats.record(&ToolMatch::default());

        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.rows_with_matches, 1);
        assert_eq!(stats.rows_without_matches, 1);
        assert_eq!(stats.total_matches, 2);
        assert_eq!(stats.matches_by_website, 2);
        assert!((stats.success_rate() - 50.0).abs() < f64::EPSILON);
    }
}
