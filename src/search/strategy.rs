//! Tiered search strategy over a [`SearchBackend`].
//!
//! Backend failures never escape this module: every lookup returns `None`
//! after logging the query it was running, and callers treat `None` as
//! "no matches".

use serde::Serialize;
use serde_json::Value;

use super::query::{self, DateField, DEFAULT_FUZZINESS};
use super::stats::IndexStatistics;
use super::url::normalize_website;
use crate::backend::{decode_entries, SearchBackend};
use crate::model::CatalogEntry;

/// Outcome of one executed query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    /// Total matches reported by the backend
    pub total: u64,
    /// Decoded hits in rank order
    pub hits: Vec<CatalogEntry>,
    /// What was searched for, for display and logs
    pub description: String,
}

impl SearchResults {
    pub fn has_hits(&self) -> bool {
        self.total > 0 || !self.hits.is_empty()
    }
}

/// Tiers of a name search, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameTier {
    /// Exact phrase or keyword match on a title
    Exact,
    /// Fuzzy, prefix and substring match on a title
    Fuzzy,
}

impl NameTier {
    /// Evaluation order; the first tier with a hit wins.
    pub const ORDER: [NameTier; 2] = [NameTier::Exact, NameTier::Fuzzy];

    fn query(self, name: &str, fuzziness: &str, size: usize) -> Value {
        match self {
            Self::Exact => query::exact_name_query(name, size),
            Self::Fuzzy => query::fuzzy_name_query(name, fuzziness, size),
        }
    }

    fn describe(self, name: &str) -> String {
        match self {
            Self::Exact => format!("exact tool name '{name}'"),
            Self::Fuzzy => format!("fuzzy tool name '{name}'"),
        }
    }
}

/// Catalog lookups against a search backend.
pub struct CatalogSearch<B> {
    backend: B,
    fuzziness: String,
}

impl<B: SearchBackend> CatalogSearch<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            fuzziness: DEFAULT_FUZZINESS.to_string(),
        }
    }

    /// Fuzziness for the fuzzy name tier (`AUTO`, `0`, `1`, `2`, ...)
    #[must_use]
    pub fn with_fuzziness(mut self, fuzziness: impl Into<String>) -> Self {
        self.fuzziness = fuzziness.into();
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Search titles for a tool name, tier by tier.
    ///
    /// Returns the first tier with any hit. When no tier hits, the last
    /// tier that executed is returned (with zero hits); `None` only when
    /// every tier failed.
    pub fn search_by_name(&self, name: &str, size: usize) -> Option<SearchResults> {
        let mut last = None;
        for tier in NameTier::ORDER {
            let query = tier.query(name, &self.fuzziness, size);
            let Some(mut results) = self.execute(&query, tier.describe(name)) else {
                continue;
            };
            if results.has_hits() {
                tracing::info!("Found {} {:?} matches for '{}'", results.total, tier, name);
                return Some(results);
            }
            if tier == NameTier::Exact {
                tracing::info!("No exact matches for '{}', performing fuzzy search", name);
            } else {
                results.description = format!(
                    "fuzzy search for tool name '{name}' (no exact matches found)"
                );
            }
            last = Some(results);
        }
        last
    }

    /// Substring search on reference URLs. The website is normalized first;
    /// an empty website yields `None`.
    pub fn search_by_website(&self, website: &str, size: usize) -> Option<SearchResults> {
        let cleaned = normalize_website(website);
        if cleaned.is_empty() {
            tracing::warn!("Empty website '{}', skipping reference search", website);
            return None;
        }
        self.execute(
            &query::website_query(&cleaned, size),
            format!("website '{cleaned}'"),
        )
    }

    pub fn search_by_exact_cpe(&self, cpe_name: &str, size: usize) -> Option<SearchResults> {
        self.execute(
            &query::exact_cpe_query(cpe_name, size),
            format!("exact CPE '{cpe_name}'"),
        )
    }

    pub fn search_by_cpe_pattern(&self, pattern: &str, size: usize) -> Option<SearchResults> {
        self.execute(
            &query::cpe_pattern_query(pattern, size),
            format!("CPE pattern '{pattern}'"),
        )
    }

    /// Positional search on identifier components; at least one is required.
    pub fn search_by_vendor_product(
        &self,
        vendor: Option<&str>,
        product: Option<&str>,
        version: Option<&str>,
        size: usize,
    ) -> Option<SearchResults> {
        let Some(query) = query::vendor_product_query(vendor, product, version, size) else {
            tracing::error!("At least one of vendor, product, or version must be specified");
            return None;
        };
        let terms: Vec<String> = [("vendor", vendor), ("product", product), ("version", version)]
            .into_iter()
            .filter_map(|(label, value)| {
                value
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{label} '{v}'"))
            })
            .collect();
        self.execute(
            &query,
            format!("vendor/product/version: {}", terms.join(", ")),
        )
    }

    pub fn search_deprecated(&self, deprecated: bool, size: usize) -> Option<SearchResults> {
        let status = if deprecated {
            "deprecated"
        } else {
            "non-deprecated"
        };
        self.execute(
            &query::deprecated_query(deprecated, size),
            format!("{status} entries"),
        )
    }

    /// Inclusive date range on `created` or `lastModified`; at least one
    /// bound is required.
    pub fn search_by_date_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        field: DateField,
        size: usize,
    ) -> Option<SearchResults> {
        let Some(query) = query::date_range_query(start, end, field, size) else {
            tracing::error!("At least one of start or end date must be specified");
            return None;
        };
        self.execute(&query, format!("date range on {}", field.as_str()))
    }

    /// Run a caller-supplied query body, adding `size` when it has none.
    pub fn advanced_search(&self, raw_query: Value, size: usize) -> Option<SearchResults> {
        let query = query::with_default_size(raw_query, size);
        self.execute(&query, "custom query".to_string())
    }

    /// Document count plus deprecated/reference-type/language breakdowns.
    pub fn statistics(&self) -> Option<IndexStatistics> {
        let response = match self.backend.search(&query::statistics_query()) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to get statistics: {}", e);
                return None;
            }
        };
        let total = match self.backend.document_count() {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Document count failed, using search total: {}", e);
                response.total()
            }
        };
        Some(IndexStatistics::from_response(total, &response))
    }

    /// Execute one query, logging and absorbing backend errors.
    fn execute(&self, query: &Value, description: String) -> Option<SearchResults> {
        tracing::info!("Searching for {}", description);
        match self.backend.search(query) {
            Ok(response) => {
                let total = response.total();
                let hits = decode_entries(&response, &description);
                tracing::info!("Found {} results for {}", total, description);
                Some(SearchResults {
                    total,
                    hits,
                    description,
                })
            }
            Err(e) => {
                tracing::error!("Search failed for {}: {}", description, e);
                None
            }
        }
    }
}
