//! Configuration types for cpe-catalog.
//!
//! Every section has working defaults so a configuration file only needs
//! the values that differ.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upstream NVD CPE 2.0 dictionary tarball.
pub const DEFAULT_FEED_URL: &str = "https://nvd.nist.gov/feeds/json/cpe/2.0/nvdcpe-2.0.tar.gz";

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Top-level configuration, loaded from `cpe-catalog.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Search backend connection
    pub backend: BackendConfig,
    /// Feed download and extraction
    pub feed: FeedConfig,
    /// Update pipeline (backup, diff, indexing)
    pub update: UpdateConfig,
    /// Tool matching
    pub matching: MatchingConfig,
    /// Terminal output
    pub output: OutputConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Backend Configuration
// ============================================================================

/// Search backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BackendConfig {
    /// `http` or `https`
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Index holding the catalog (lowercase)
    pub index: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 9200,
            index: "cpe".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    /// Base URL of the backend, e.g. `http://localhost:9200`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

// ============================================================================
// Feed Configuration
// ============================================================================

/// Where the feed comes from and where it is unpacked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FeedConfig {
    /// Tarball URL
    pub url: String,
    /// Directory the archive is downloaded to and extracted in
    pub extract_dir: PathBuf,
    /// File name of the downloaded archive
    pub archive_name: String,
    /// Directory inside the archive holding the chunk files
    pub chunks_dir: String,
    /// File name prefix of chunk files
    pub chunk_prefix: String,
    /// Remove the archive after a successful extraction
    pub cleanup_archive: bool,
    /// Download timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            extract_dir: PathBuf::from("./data"),
            archive_name: "nvdcpe-2.0.tar.gz".to_string(),
            chunks_dir: "nvdcpe-2.0-chunks".to_string(),
            chunk_prefix: "nvdcpe-2.0-chunk-".to_string(),
            cleanup_archive: true,
            timeout_secs: 600,
        }
    }
}

impl FeedConfig {
    pub fn archive_path(&self) -> PathBuf {
        self.extract_dir.join(&self.archive_name)
    }

    pub fn chunks_path(&self) -> PathBuf {
        self.extract_dir.join(&self.chunks_dir)
    }
}

// ============================================================================
// Update Configuration
// ============================================================================

/// Update pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct UpdateConfig {
    /// Where backups of the previous catalog are written
    pub backup_dir: PathBuf,
    /// Where diff reports are written
    pub diff_dir: PathBuf,
    /// Documents per bulk request
    pub batch_size: usize,
    /// Documents per scroll page when exporting
    pub scroll_size: usize,
    /// List unchanged entries in diff reports
    pub include_unchanged: bool,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            backup_dir: PathBuf::from("./backups"),
            diff_dir: PathBuf::from("./diffs"),
            batch_size: 1000,
            scroll_size: 1000,
            include_unchanged: true,
        }
    }
}

// ============================================================================
// Matching Configuration
// ============================================================================

/// Tool matching settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MatchingConfig {
    /// Hits requested per lookup
    pub result_size: usize,
    /// Fuzziness of the fuzzy name tier (`AUTO`, `0`, `1`, `2`)
    pub fuzziness: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            result_size: 50,
            fuzziness: "AUTO".to_string(),
        }
    }
}

// ============================================================================
// Output Configuration
// ============================================================================

/// Terminal output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Disable colored output
    pub no_color: bool,
}
