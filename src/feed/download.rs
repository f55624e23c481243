//! Feed tarball download and extraction.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tar::Archive;

use super::FeedSource;
use crate::config::FeedConfig;
use crate::error::{CatalogError, FeedErrorKind, Result};

/// Read buffer used while streaming the archive to disk.
const CHUNK_SIZE: usize = 64 * 1024;

/// Downloads and unpacks the upstream feed.
pub struct FeedDownloader {
    config: FeedConfig,
}

impl FeedDownloader {
    /// Create a downloader for the given feed settings
    #[must_use]
    pub const fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Download the archive into `extract_dir`.
    ///
    /// An archive already on disk is reused unless `force` is set. The body
    /// is written to a `.part` file first so an interrupted transfer never
    /// looks like a complete archive.
    pub fn download(&self, force: bool) -> Result<PathBuf> {
        let archive = self.config.archive_path();
        if archive.is_file() && !force {
            tracing::info!(
                "Archive {} already present, skipping download (use --force to refresh)",
                archive.display()
            );
            return Ok(archive);
        }

        fs::create_dir_all(&self.config.extract_dir)
            .map_err(|e| CatalogError::io(&self.config.extract_dir, e))?;

        tracing::info!("Downloading {}", self.config.url);
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| download_error(&self.config.url, e))?;

        let mut response = client
            .get(&self.config.url)
            .send()
            .map_err(|e| download_error(&self.config.url, e))?;

        if !response.status().is_success() {
            return Err(CatalogError::feed(
                format!("GET {}", self.config.url),
                FeedErrorKind::DownloadFailed(format!("server returned status {}", response.status())),
            ));
        }

        let total = response_len(&response);
        let partial = archive.with_extension("part");
        let written = {
            let file = File::create(&partial).map_err(|e| CatalogError::io(&partial, e))?;
            let mut writer = BufWriter::new(file);
            let written = stream_with_progress(&mut response, &mut writer, total)
                .map_err(|e| {
                    CatalogError::feed(
                        format!("GET {}", self.config.url),
                        FeedErrorKind::DownloadFailed(e.to_string()),
                    )
                })?;
            writer.flush().map_err(|e| CatalogError::io(&partial, e))?;
            written
        };
        fs::rename(&partial, &archive).map_err(|e| CatalogError::io(&archive, e))?;

        tracing::info!("Downloaded {} bytes to {}", written, archive.display());
        Ok(archive)
    }

    /// Unpack the archive into `extract_dir`, returning the number of
    /// entries written.
    pub fn extract(&self) -> Result<usize> {
        let archive_path = self.config.archive_path();
        let file = File::open(&archive_path).map_err(|e| CatalogError::io(&archive_path, e))?;
        let count = unpack_tar_gz(file, &self.config.extract_dir).map_err(|e| {
            CatalogError::feed(
                format!("extracting {}", archive_path.display()),
                FeedErrorKind::ExtractionFailed(e.to_string()),
            )
        })?;
        tracing::info!(
            "Extracted {} entries into {}",
            count,
            self.config.extract_dir.display()
        );
        Ok(count)
    }

    /// Remove the downloaded archive.
    pub fn cleanup(&self) -> Result<()> {
        let archive = self.config.archive_path();
        if archive.exists() {
            fs::remove_file(&archive).map_err(|e| CatalogError::io(&archive, e))?;
            tracing::info!("Removed archive {}", archive.display());
        }
        Ok(())
    }
}

impl FeedSource for FeedDownloader {
    fn fetch(&self, force: bool) -> Result<()> {
        self.download(force)?;
        self.extract()?;
        if self.config.cleanup_archive {
            if let Err(e) = self.cleanup() {
                tracing::warn!("Failed to remove archive: {}", e);
            }
        }
        Ok(())
    }

    fn chunk_files(&self) -> Result<Vec<PathBuf>> {
        list_chunk_files(&self.config.chunks_path(), &self.config.chunk_prefix)
    }
}

/// List `<prefix>*.json` files in `dir`, sorted by name.
pub fn list_chunk_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CatalogError::feed(
            "listing chunk files",
            FeedErrorKind::NoChunkFiles(dir.display().to_string()),
        ));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| CatalogError::io(dir, e))? {
        let path = entry.map_err(|e| CatalogError::io(dir, e))?.path();
        let matches = path.is_file()
            && path.extension().is_some_and(|ext| ext == "json")
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    tracing::info!("Found {} chunk files in {}", files.len(), dir.display());
    Ok(files)
}

fn download_error(url: &str, err: reqwest::Error) -> CatalogError {
    CatalogError::feed(
        format!("GET {url}"),
        FeedErrorKind::DownloadFailed(err.to_string()),
    )
}

fn response_len(response: &reqwest::blocking::Response) -> Option<u64> {
    response.content_length().filter(|len| *len > 0)
}

/// Copy `reader` to `writer`, logging every 10% when the length is known.
fn stream_with_progress<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    total: Option<u64>,
) -> std::io::Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    let mut next_decile: u64 = 1;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        written += n as u64;

        if let Some(total) = total {
            while next_decile <= 10 && written * 10 >= total * next_decile {
                tracing::info!("Download progress: {}%", next_decile * 10);
                next_decile += 1;
            }
        }
    }
    Ok(written)
}

/// Unpack a gzip tarball below `dest`. Entries that would escape `dest`
/// are skipped by `unpack_in`.
fn unpack_tar_gz<R: Read>(reader: R, dest: &Path) -> std::io::Result<usize> {
    fs::create_dir_all(dest)?;
    let mut archive = Archive::new(GzDecoder::new(reader));
    let mut count = 0;
    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.unpack_in(dest)? {
            count += 1;
        } else {
            tracing::warn!("Skipped archive entry outside {}", dest.display());
        }
    }
    Ok(count)
}
