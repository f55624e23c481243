//! Match-csv command handler.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::connect;
use crate::config::AppConfig;
use crate::matching::{match_csv, MatchCsvOptions, MatchingEngine};
use crate::reports::SummaryReporter;
use crate::search::CatalogSearch;

/// Run the match-csv command
pub fn run_match_csv(
    config: &AppConfig,
    input: &Path,
    tool_col: usize,
    website_col: usize,
    output: PathBuf,
    colored: bool,
) -> Result<()> {
    let client = connect(config)?;
    let search = CatalogSearch::new(&client).with_fuzziness(config.matching.fuzziness.clone());
    let engine = MatchingEngine::new(search).with_result_size(config.matching.result_size);

    let options = MatchCsvOptions {
        tool_col,
        website_col,
        output,
    };
    let stats = match_csv(&engine, input, &options)
        .with_context(|| format!("Failed to process CSV {}", input.display()))?;

    println!(
        "{}",
        SummaryReporter::new()
            .colored(colored)
            .match_summary(&stats, &options.output)
    );
    Ok(())
}
