//! **A searchable catalog of CPE identifiers with update diffs and tool matching.**
//!
//! `cpe-catalog` keeps an Elasticsearch-compatible index in step with the
//! NVD CPE 2.0 dictionary feed and answers "which CPE is this tool?" for
//! free-text tool names and websites.
//!
//! ## Key Features
//!
//! - **Feed ingestion**: downloads and unpacks the NVD tarball and maps its
//!   chunk files to [`CatalogEntry`] records with normalized timestamps.
//! - **Update diffs**: every update backs up the current index and reports
//!   added, removed, modified and newly deprecated entries as JSON and CSV.
//! - **Tiered search**: exact title matches first, fuzzy/prefix/substring
//!   matches only when nothing exact exists.
//! - **Tool matching**: website-first, name-second lookups whose hits are
//!   consolidated into one [`MatchGroup`] per vendor/product.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: [`CatalogEntry`], [`Snapshot`], [`CpeName`] and [`MatchGroup`].
//! - **[`diff`]**: the [`DiffEngine`], a pure comparison of two snapshots.
//! - **[`update`]**: the [`UpdateOrchestrator`] running backup → download →
//!   load → diff → reindex.
//! - **[`backend`]**: the [`SearchBackend`] trait and its HTTP client.
//! - **[`search`]**: [`CatalogSearch`] and the query builders.
//! - **[`matching`]**: grouping, the [`MatchingEngine`] and batch CSV matching.
//! - **[`feed`]**: download, extraction and chunk-file mapping.
//! - **[`reports`]**: JSON/CSV report writers and terminal summaries.
//!
//! ## Diffing two snapshots
//!
//! ```
//! use cpe_catalog::{CatalogEntry, DiffEngine, Snapshot};
//!
//! let name = "cpe:2.3:a:acme:tool:1.0:*:*:*:*:*:*:*";
//! let old = Snapshot::from_entries(vec![CatalogEntry::new(name)]);
//! let new = Snapshot::from_entries(vec![CatalogEntry::new(name).with_deprecated(true)]);
//!
//! let result = DiffEngine::new().diff(&old, &new);
//! assert_eq!(result.statistics.modified, 1);
//! assert_eq!(result.statistics.deprecated_transitions, 1);
//! ```
//!
//! ## Grouping hits
//!
//! ```
//! use cpe_catalog::{matching::group_hits, CatalogEntry, Provenance};
//!
//! let hits = vec![
//!     CatalogEntry::new("cpe:2.3:a:acme:tool:1.0:*:*:*:*:*:*:*"),
//!     CatalogEntry::new("cpe:2.3:a:acme:tool:2.0:*:*:*:*:*:*:*"),
//! ];
//! let groups = group_hits(&hits, Provenance::Name);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].versions, vec!["1.0", "2.0"]);
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::similar_names
)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod feed;
pub mod matching;
pub mod model;
pub mod reports;
pub mod search;
pub mod update;

// Re-export main types for convenience
pub use backend::{ElasticClient, SearchBackend};
pub use config::{AppConfig, ConfigError, Validatable};
pub use diff::{ChangeReport, DiffEngine, DiffResult, UpdateCounters};
pub use error::{CatalogError, ErrorContext, OptionContext, Result};
pub use feed::{FeedDownloader, FeedSource};
pub use matching::{MatchingEngine, ToolMatch};
pub use model::{CatalogEntry, CpeName, MatchGroup, Provenance, Snapshot};
pub use search::{CatalogSearch, SearchResults};
pub use update::{UpdateOptions, UpdateOrchestrator, UpdateOutcome};
