//! Index lifecycle and feed command handlers.
//!
//! Implements `setup`, `recreate-index`, `download`, `parse-and-index` and
//! `full-pipeline`.

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};

use super::{confirm, connect, ensure_reachable, run_search_demo};
use crate::backend::SearchBackend;
use crate::config::AppConfig;
use crate::feed::{FeedDownloader, FeedSource};
use crate::update::parse_and_index;

/// Run the setup command: check the backend and create the index.
pub fn run_setup(config: &AppConfig, assume_yes: bool) -> Result<()> {
    let client = connect(config)?;
    let stdin = io::stdin();
    setup_index(
        &client,
        &config.backend.url(),
        assume_yes,
        &mut stdin.lock(),
        &mut io::stderr(),
    )
}

/// Create the catalog index, deleting an existing one after confirmation.
pub(crate) fn setup_index<B, R, W>(
    backend: &B,
    url: &str,
    assume_yes: bool,
    input: &mut R,
    output: &mut W,
) -> Result<()>
where
    B: SearchBackend + ?Sized,
    R: BufRead,
    W: Write,
{
    ensure_reachable(&backend, url)?;

    if backend.index_exists()? {
        let count = backend.document_count().unwrap_or(0);
        writeln!(output, "Index already exists with {count} documents.")?;
        if !assume_yes {
            writeln!(output, "Proceeding will DELETE ALL existing data and create a new index.")?;
            if !confirm("Do you want to continue?", input, output)? {
                bail!("Operation cancelled by user");
            }
        }
        backend.delete_index().context("Failed to delete existing index")?;
    }

    backend.create_index().context("Failed to create index")?;
    println!("Index created");
    Ok(())
}

/// Run the recreate-index command.
pub fn run_recreate_index(config: &AppConfig) -> Result<()> {
    let client = connect(config)?;
    ensure_reachable(&client, &config.backend.url())?;
    client.delete_index().context("Failed to delete index")?;
    client.create_index().context("Failed to create index")?;
    println!("Index '{}' recreated with the current mapping", client.index());
    Ok(())
}

/// Run the download command.
pub fn run_download(config: &AppConfig, force: bool) -> Result<()> {
    let downloader = FeedDownloader::new(config.feed.clone());
    downloader
        .fetch(force)
        .context("Failed to download or extract data")?;
    let files = downloader.chunk_files()?;
    println!(
        "Feed extracted: {} chunk files ready in {}",
        files.len(),
        config.feed.chunks_path().display()
    );
    Ok(())
}

/// Run the parse-and-index command.
pub fn run_parse_and_index(config: &AppConfig) -> Result<()> {
    let client = connect(config)?;
    let downloader = FeedDownloader::new(config.feed.clone());

    let indexed = parse_and_index(&client, &downloader, config.update.batch_size)
        .context("Failed to parse feed")?;
    if indexed == 0 {
        bail!("Failed to index any documents");
    }
    println!("Indexed {indexed} CPE entries");
    match client.document_count() {
        Ok(count) => println!("Total documents in index: {count}"),
        Err(e) => tracing::warn!("Could not read document count: {}", e),
    }
    Ok(())
}

/// Run setup, download and parse-and-index, then the search demo.
pub fn run_full_pipeline(config: &AppConfig, force_download: bool, colored: bool) -> Result<()> {
    let steps: [(&str, &dyn Fn() -> Result<()>); 3] = [
        ("setup", &|| run_setup(config, false)),
        ("download", &|| run_download(config, force_download)),
        ("parse-and-index", &|| run_parse_and_index(config)),
    ];
    for (name, step) in steps {
        tracing::info!("Pipeline step: {}", name);
        step().with_context(|| format!("Pipeline failed at step '{name}'"))?;
    }
    println!("Pipeline completed");
    run_search_demo(config, colored)
}
