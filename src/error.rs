//! Unified error types for cpe-catalog.
//!
//! Recoverable per-record problems are logged and skipped at the call site;
//! the variants here describe failures that cross a component boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cpe-catalog operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CatalogError {
    /// Errors while reading or mapping feed data
    #[error("Failed to parse feed data: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors while downloading or unpacking the feed
    #[error("Feed operation failed: {context}")]
    Feed {
        context: String,
        #[source]
        source: FeedErrorKind,
    },

    /// Errors talking to the search backend
    #[error("Search backend request failed: {context}")]
    Backend {
        context: String,
        #[source]
        source: BackendErrorKind,
    },

    /// Errors during report generation
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: crate::reports::ReportError,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Unexpected feed format: {0}")]
    UnexpectedFormat(String),

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid CSV structure: {0}")]
    InvalidCsv(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Malformed CPE name: {name} - {reason}")]
    InvalidCpe { name: String, reason: String },
}

/// Specific feed error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FeedErrorKind {
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Archive extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("No chunk files found in {0}")]
    NoChunkFiles(String),
}

/// Specific backend error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BackendErrorKind {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Malformed query: {0}")]
    InvalidQuery(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for cpe-catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl CatalogError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for a missing field
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::parse(
            "missing required field",
            ParseErrorKind::MissingField {
                field: field.into(),
                context: context.into(),
            },
        )
    }

    /// Create a feed error with context
    pub fn feed(context: impl Into<String>, source: FeedErrorKind) -> Self {
        Self::Feed {
            context: context.into(),
            source,
        }
    }

    /// Create a backend error with context
    pub fn backend(context: impl Into<String>, source: BackendErrorKind) -> Self {
        Self::Backend {
            context: context.into(),
            source,
        }
    }

    /// Create a report error with context
    pub fn report(context: impl Into<String>, source: crate::reports::ReportError) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        Self::parse("CSV processing", ParseErrorKind::InvalidCsv(err.to_string()))
    }
}

impl From<crate::reports::ReportError> for CatalogError {
    fn from(err: crate::reports::ReportError) -> Self {
        Self::report("", err)
    }
}

// ============================================================================
// Context
// ============================================================================

/// Attach a description of the failing step to an error.
///
/// Contexts stack outermost-first, e.g.
/// `"loading snapshot: reading nvdcpe-2.0-chunk-00001.json: ..."`.
pub trait ErrorContext<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Like [`ErrorContext::context`], building the description only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<CatalogError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let step: String = context.into();
        self.map_err(|e| prefix_context(e.into(), &step))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| prefix_context(e.into(), &f().into()))
    }
}

fn prefix_context(err: CatalogError, step: &str) -> CatalogError {
    match err {
        CatalogError::Parse { context, source } => CatalogError::Parse {
            context: join_context(step, &context),
            source,
        },
        CatalogError::Feed { context, source } => CatalogError::Feed {
            context: join_context(step, &context),
            source,
        },
        CatalogError::Backend { context, source } => CatalogError::Backend {
            context: join_context(step, &context),
            source,
        },
        CatalogError::Report { context, source } => CatalogError::Report {
            context: join_context(step, &context),
            source,
        },
        CatalogError::Io {
            path,
            message,
            source,
        } => CatalogError::Io {
            path,
            message: join_context(step, &message),
            source,
        },
        CatalogError::Config(msg) => CatalogError::Config(join_context(step, &msg)),
        CatalogError::Validation(msg) => CatalogError::Validation(join_context(step, &msg)),
    }
}

fn join_context(step: &str, inner: &str) -> String {
    if inner.is_empty() {
        step.to_string()
    } else {
        format!("{step}: {inner}")
    }
}

/// Turn a missing value into a [`CatalogError::Validation`].
pub trait OptionContext<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| CatalogError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| CatalogError::Validation(f().into()))
    }
}
