//! Update command handler.

use anyhow::Result;

use super::{connect, exit_codes};
use crate::config::AppConfig;
use crate::feed::FeedDownloader;
use crate::reports::SummaryReporter;
use crate::update::{UpdateOptions, UpdateOrchestrator};

/// Run the update command. Returns the process exit code; the failure
/// cause is part of the printed summary.
pub fn run_update(
    config: &AppConfig,
    force_download: bool,
    no_diff: bool,
    colored: bool,
) -> Result<i32> {
    let client = connect(config)?;
    let downloader = FeedDownloader::new(config.feed.clone());
    let orchestrator = UpdateOrchestrator::new(&client, &downloader, config.update.clone());

    let outcome = orchestrator.run(UpdateOptions {
        force_download,
        create_diff: !no_diff,
    });

    println!(
        "{}",
        SummaryReporter::new().colored(colored).update_summary(&outcome)
    );
    if outcome.is_success() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::FAILURE)
    }
}
