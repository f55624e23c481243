//! Timestamped report files.

use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::ReportError;

/// Run timestamp shared by every file of one update run (`YYYYmmdd_HHMMSS`).
pub fn run_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn backup_file_name(timestamp: &str) -> String {
    format!("cpe_backup_{timestamp}.json")
}

pub fn diff_file_name(timestamp: &str) -> String {
    format!("cpe_diff_{timestamp}.json")
}

pub fn diff_csv_file_name(timestamp: &str) -> String {
    format!("cpe_diff_summary_{timestamp}.csv")
}

/// A directory that reports are written into.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Open a store, creating the directory when missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under `name`, replacing any existing file.
    pub fn store(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
        let path = self.dir.join(name);
        fs::write(&path, bytes)?;
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Write `value` as pretty-printed JSON under `name`.
    pub fn store_json<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<PathBuf, ReportError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.store(name, &bytes)
    }
}
