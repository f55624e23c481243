//! Configuration file loading and discovery.
//!
//! A configuration file is required by every command that talks to the
//! backend or the feed. It is looked up in standard locations when no path
//! is given explicitly.

use super::types::AppConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// File names recognized in each search directory, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &["cpe-catalog.yaml", "cpe-catalog.yml", ".cpe-catalog.yaml"];

/// Directory name under the platform config directory.
const APP_DIR: &str = "cpe-catalog";

/// Directories searched for a config file, in order:
/// 1. Current directory
/// 2. User config directory (`~/.config/cpe-catalog/`)
/// 3. Home directory
pub fn search_dirs() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd);
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(APP_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home);
    }
    candidates
}

/// Discover a config file. An explicit path is returned as is, whether or
/// not it exists, so that loading reports it as missing.
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }
    search_dirs()
        .iter()
        .find_map(|dir| find_config_in_dir(dir))
}

/// First recognized config file name present in `dir`.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Why no configuration could be loaded.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// An explicit path does not exist
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// No file in any of the searched directories
    #[error(
        "No config file ({}) found in: {}. Run `cpe-catalog config init` to create one",
        CONFIG_FILE_NAMES.join(", "),
        display_dirs(.0)
    )]
    NotDiscovered(Vec<PathBuf>),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read and parse one YAML config file. An empty file yields the defaults.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load the config file, failing when none can be found.
pub fn load_required(explicit_path: Option<&Path>) -> Result<(AppConfig, PathBuf), ConfigFileError> {
    let path = discover_config_file(explicit_path)
        .ok_or_else(|| ConfigFileError::NotDiscovered(search_dirs()))?;
    let config = load_config_file(&path)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok((config, path))
}

/// Load the discovered config file, falling back to the defaults when
/// there is none or it cannot be read.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Commented YAML holding every setting at its default.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# CPE catalog configuration
# Place this file at ./cpe-catalog.yaml or ~/.config/cpe-catalog/cpe-catalog.yaml

{}",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

// ============================================================================
// Tests
// ============================================================================
