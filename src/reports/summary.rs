//! Summary report generator for shell output.
//!
//! Provides compact, human-readable summaries of update runs, matching runs,
//! index statistics and search results.

use std::path::Path;

use crate::matching::{MatchStats, ToolMatch};
use crate::search::{IndexStatistics, SearchResults};
use crate::update::UpdateOutcome;

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Summary reporter for shell output
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Set colored output
    #[must_use]
    pub const fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn rule(&self) -> String {
        self.color("─".repeat(40).as_str(), "dim")
    }

    /// Outcome of an update run.
    pub fn update_summary(&self, outcome: &UpdateOutcome) -> String {
        if let Some(failure) = &outcome.failure {
            return format!(
                "{} {}",
                self.color("Update failed:", "red"),
                failure
            );
        }

        let mut lines = vec![
            self.color("CPE catalog updated", "bold"),
            self.rule(),
            format!("{}  {}", self.color("Timestamp:", "cyan"), outcome.timestamp),
            format!(
                "{}  {}",
                self.color("Indexed:", "cyan"),
                outcome.total_indexed
            ),
        ];

        if let Some(stats) = &outcome.statistics {
            lines.push(String::new());
            lines.push(self.color("Changes:", "bold"));
            lines.push(format!(
                "  {} added",
                self.color(&format!("+{}", stats.added), "green")
            ));
            lines.push(format!(
                "  {} modified",
                self.color(&format!("~{}", stats.modified), "yellow")
            ));
            lines.push(format!(
                "  {} newly deprecated",
                self.color(&format!("!{}", stats.deprecated_transitions), "red")
            ));
            lines.push(format!(
                "  {} removed",
                self.color(&format!("-{}", stats.removed), "red")
            ));
            lines.push(format!("  {} unchanged", stats.unchanged));
            lines.push(format!(
                "  {} → {} entries",
                stats.total_old, stats.total_new
            ));
        }

        let files = [
            ("Backup:", &outcome.backup_file),
            ("Diff report:", &outcome.diff_file),
            ("CSV summary:", &outcome.csv_diff_file),
        ];
        let mut printed_header = false;
        for (label, path) in files {
            if let Some(path) = path {
                if !printed_header {
                    lines.push(String::new());
                    printed_header = true;
                }
                lines.push(format!("{}  {}", self.color(label, "cyan"), path.display()));
            }
        }

        lines.join("\n")
    }

    /// Statistics of a batch matching run.
    pub fn match_summary(&self, stats: &MatchStats, output: &Path) -> String {
        let lines = [
            self.color("CPE matching results", "bold"),
            self.rule(),
            format!("{}  {}", self.color("Rows processed:", "cyan"), stats.total_rows),
            format!(
                "{}  {}",
                self.color("With matches:", "cyan"),
                self.color(&stats.rows_with_matches.to_string(), "green")
            ),
            format!(
                "{}  {}",
                self.color("Without matches:", "cyan"),
                self.color(&stats.rows_without_matches.to_string(), "red")
            ),
            format!(
                "{}  {:.1}%",
                self.color("Success rate:", "cyan"),
                stats.success_rate()
            ),
            format!(
                "{}  {} (website {}, name {})",
                self.color("Groups found:", "cyan"),
                stats.total_matches,
                stats.matches_by_website,
                stats.matches_by_name
            ),
            format!("{}  {}", self.color("Output:", "cyan"), output.display()),
        ];
        lines.join("\n")
    }

    /// Document count and aggregation breakdowns.
    pub fn index_summary(&self, stats: &IndexStatistics) -> String {
        let mut lines = vec![
            self.color("CPE index statistics", "bold"),
            self.rule(),
            format!(
                "{}  {}",
                self.color("Documents:", "cyan"),
                stats.total_documents
            ),
            format!(
                "{}  {}",
                self.color("Deprecated:", "cyan"),
                stats.deprecated_count()
            ),
        ];

        let sections = [
            ("Reference types:", &stats.reference_types),
            ("Title languages:", &stats.languages),
        ];
        for (label, buckets) in sections {
            if buckets.is_empty() {
                continue;
            }
            lines.push(self.color(label, "cyan"));
            for (key, count) in buckets {
                lines.push(format!("  {key}: {count}"));
            }
        }
        lines.join("\n")
    }

    /// Hits of one search, at most `limit` of them.
    pub fn search_results(&self, results: &SearchResults, limit: usize) -> String {
        let mut lines = vec![format!(
            "{}  {} ({} total)",
            self.color("Search:", "cyan"),
            results.description,
            results.total
        )];
        if !results.has_hits() {
            lines.push(format!("  {}", self.color("No results", "dim")));
            return lines.join("\n");
        }
        for (idx, hit) in results.hits.iter().take(limit).enumerate() {
            let title = hit.first_title();
            let title = if title.is_empty() { "(untitled)" } else { title };
            let marker = if hit.deprecated {
                self.color(" [deprecated]", "yellow")
            } else {
                String::new()
            };
            lines.push(format!("  {}. {}{}", idx + 1, title, marker));
            lines.push(format!("     {}", self.color(&hit.cpe_name, "dim")));
        }
        lines.join("\n")
    }

    /// Groups found for one tool.
    pub fn tool_match(&self, result: &ToolMatch) -> String {
        let mut lines = Vec::new();
        if !result.cleaned_website.is_empty() {
            lines.push(format!(
                "{}  {}",
                self.color("Website:", "cyan"),
                result.cleaned_website
            ));
        }
        if !result.is_match() {
            lines.push(format!("  {}", self.color("No CPE matches", "dim")));
            return lines.join("\n");
        }
        for (idx, group) in result.groups.iter().enumerate() {
            lines.push(format!(
                "  {}. {} {}",
                idx + 1,
                self.color(&group.cpe, "green"),
                self.color(&format!("[{}]", group.found_by), "dim")
            ));
            lines.push(format!(
                "     {} / {}, {} version(s): {}",
                group.vendor,
                group.product,
                group.version_count(),
                group.versions.join(", ")
            ));
        }
        lines.join("\n")
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}
