//! Configuration validation for cpe-catalog.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::*;
use crate::error::CatalogError;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Fail with every validation message joined when `config` is invalid.
pub fn ensure_valid(config: &impl Validatable) -> crate::error::Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    Err(CatalogError::config(messages.join("; ")))
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.backend.validate());
        errors.extend(self.feed.validate());
        errors.extend(self.update.validate());
        errors.extend(self.matching.validate());
        errors
    }
}

/// Characters the backend rejects in index names.
const INVALID_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#', ':'];

impl Validatable for BackendConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !matches!(self.scheme.as_str(), "http" | "https") {
            errors.push(ConfigError::new(
                "backend.scheme",
                format!("Scheme must be http or https, got '{}'", self.scheme),
            ));
        }
        if self.host.trim().is_empty() {
            errors.push(ConfigError::new("backend.host", "Host must not be empty"));
        }
        if self.port == 0 {
            errors.push(ConfigError::new("backend.port", "Port must be non-zero"));
        }
        if self.timeout_secs == 0 {
            errors.push(ConfigError::new(
                "backend.timeout_secs",
                "Timeout must be at least 1 second",
            ));
        }

        if self.index.is_empty() {
            errors.push(ConfigError::new("backend.index", "Index name must not be empty"));
        } else if self.index != self.index.to_lowercase() {
            errors.push(ConfigError::new(
                "backend.index",
                format!("Index name must be lowercase, got '{}'", self.index),
            ));
        } else if self.index.contains(INVALID_INDEX_CHARS)
            || self.index.starts_with(['-', '_', '+'])
        {
            errors.push(ConfigError::new(
                "backend.index",
                format!("Invalid index name '{}'", self.index),
            ));
        }

        if errors.is_empty() {
            if let Err(e) = url::Url::parse(&self.url()) {
                errors.push(ConfigError::new(
                    "backend",
                    format!("Backend URL '{}' is invalid: {e}", self.url()),
                ));
            }
        }

        errors
    }
}

impl Validatable for FeedConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        match url::Url::parse(&self.url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(ConfigError::new(
                "feed.url",
                format!("Unsupported URL scheme '{}'", parsed.scheme()),
            )),
            Err(e) => errors.push(ConfigError::new(
                "feed.url",
                format!("Invalid URL '{}': {e}", self.url),
            )),
        }
        if self.archive_name.trim().is_empty() {
            errors.push(ConfigError::new(
                "feed.archive_name",
                "Archive name must not be empty",
            ));
        }
        if self.chunks_dir.trim().is_empty() {
            errors.push(ConfigError::new(
                "feed.chunks_dir",
                "Chunks directory must not be empty",
            ));
        }
        if self.timeout_secs == 0 {
            errors.push(ConfigError::new(
                "feed.timeout_secs",
                "Timeout must be at least 1 second",
            ));
        }

        errors
    }
}

impl Validatable for UpdateConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.batch_size == 0 {
            errors.push(ConfigError::new(
                "update.batch_size",
                "Batch size must be at least 1",
            ));
        }
        if self.scroll_size == 0 {
            errors.push(ConfigError::new(
                "update.scroll_size",
                "Scroll size must be at least 1",
            ));
        }
        errors
    }
}

impl Validatable for MatchingConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.result_size == 0 {
            errors.push(ConfigError::new(
                "matching.result_size",
                "Result size must be at least 1",
            ));
        }
        if !is_valid_fuzziness(&self.fuzziness) {
            errors.push(ConfigError::new(
                "matching.fuzziness",
                format!(
                    "Invalid fuzziness '{}'. Valid options: AUTO, AUTO:<low>,<high>, 0, 1, 2",
                    self.fuzziness
                ),
            ));
        }
        errors
    }
}

fn is_valid_fuzziness(value: &str) -> bool {
    if matches!(value, "AUTO" | "0" | "1" | "2") {
        return true;
    }
    let Some(bounds) = value.strip_prefix("AUTO:") else {
        return false;
    };
    let mut parts = bounds.split(',');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(low), Some(high), None)
            if low.parse::<u32>().is_ok() && high.parse::<u32>().is_ok()
    )
}
