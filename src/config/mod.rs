//! Configuration module for cpe-catalog.
//!
//! This module provides:
//! - Type-safe configuration structures with defaults
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//!
//! # Configuration File
//!
//! Place a `cpe-catalog.yaml` file in the working directory or
//! `~/.config/cpe-catalog/`:
//!
//! ```yaml
//! backend:
//!   host: localhost
//!   port: 9200
//!   index: cpe
//! update:
//!   batch_size: 1000
//! ```

pub mod file;
mod types;
mod validation;

pub use types::{
    AppConfig, BackendConfig, FeedConfig, MatchingConfig, OutputConfig, UpdateConfig,
    DEFAULT_FEED_URL,
};
pub use validation::{ensure_valid, ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    load_required, search_dirs, ConfigFileError, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and autocomplete `cpe-catalog.yaml`.
pub fn generate_json_schema() -> serde_json::Result<String> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}
