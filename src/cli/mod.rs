//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the logic for one subcommand and prints a
//! human-readable summary; failures are returned as errors so `main` exits
//! with [`exit_codes::FAILURE`].

mod index;
mod matching;
mod search;
mod update;

pub use index::{run_download, run_full_pipeline, run_parse_and_index, run_recreate_index, run_setup};
pub use matching::run_match_csv;
pub use search::{
    interactive_loop, run_interactive_search, run_search_demo, InteractiveCommand,
};
pub use update::run_update;

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::backend::{ElasticClient, SearchBackend};
use crate::config::{ensure_valid, load_required, AppConfig};

/// Process exit codes
pub mod exit_codes {
    /// Command completed
    pub const SUCCESS: i32 = 0;
    /// Command failed
    pub const FAILURE: i32 = 1;
}

/// Load and validate the configuration file. A missing file is fatal.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let (config, path) = load_required(explicit)?;
    ensure_valid(&config).with_context(|| format!("validating {}", path.display()))?;
    Ok(config)
}

/// Backend client for the configured index.
pub fn connect(config: &AppConfig) -> Result<ElasticClient> {
    ElasticClient::from_config(&config.backend)
        .with_context(|| format!("creating client for {}", config.backend.url()))
}

/// Fail unless the backend answers.
fn ensure_reachable(backend: &impl SearchBackend, url: &str) -> Result<()> {
    let info = backend
        .info()
        .with_context(|| format!("Failed to connect to search backend at {url}"))?;
    tracing::info!(
        "Connected to cluster '{}' (version {})",
        info.cluster_name,
        info.version.number
    );
    Ok(())
}

/// Ask a yes/no question until it is answered. End of input counts as no.
fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> Result<bool> {
    loop {
        write!(output, "{prompt} (yes/no): ")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim().to_lowercase().as_str() {
            "yes" | "y" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => writeln!(output, "Please enter 'yes' or 'no'.")?,
        }
    }
}
