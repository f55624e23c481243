//! Catalog search.
//!
//! - [`CatalogSearch`]: lookups over a [`SearchBackend`](crate::backend::SearchBackend),
//!   including the tiered exact-then-fuzzy name search
//! - [`query`]: request bodies and their boost weights
//! - [`normalize_website`]: host+path reduction applied before URL searches

pub mod query;
mod stats;
mod strategy;
mod url;

pub use query::DateField;
pub use stats::IndexStatistics;
pub use strategy::{CatalogSearch, NameTier, SearchResults};
pub use url::normalize_website;

/// Result size used by interactive and demo searches.
pub const DEFAULT_RESULT_SIZE: usize = 10;
