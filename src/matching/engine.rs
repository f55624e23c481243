//! Per-tool matching policy.

use serde::Serialize;

use super::grouping::group_hits;
use crate::backend::SearchBackend;
use crate::model::{MatchGroup, Provenance};
use crate::search::{normalize_website, CatalogSearch};

/// Result size used for matching lookups.
pub const DEFAULT_MATCH_RESULT_SIZE: usize = 50;

/// Lookups tried for one tool, in priority order. The first lookup that
/// produces a group wins; results are never merged across lookups.
pub const LOOKUP_ORDER: [Provenance; 2] = [Provenance::Website, Provenance::Name];

/// Matches found for one tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolMatch {
    pub tool_name: String,
    pub website: String,
    /// Website after normalization, empty when none was given
    pub cleaned_website: String,
    pub groups: Vec<MatchGroup>,
}

impl ToolMatch {
    pub fn is_match(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Lookup that produced the groups, if any.
    pub fn found_by(&self) -> Option<Provenance> {
        self.groups.first().map(|g| g.found_by)
    }
}

/// Website-first, name-second matching over a catalog search.
pub struct MatchingEngine<B> {
    search: CatalogSearch<B>,
    result_size: usize,
}

impl<B: SearchBackend> MatchingEngine<B> {
    pub fn new(search: CatalogSearch<B>) -> Self {
        Self {
            search,
            result_size: DEFAULT_MATCH_RESULT_SIZE,
        }
    }

    #[must_use]
    pub fn with_result_size(mut self, size: usize) -> Self {
        self.result_size = size;
        self
    }

    pub fn search(&self) -> &CatalogSearch<B> {
        &self.search
    }

    /// Match a tool by website and/or name. Empty inputs skip their lookup.
    pub fn match_tool(&self, tool_name: &str, website: &str) -> ToolMatch {
        let tool_name = tool_name.trim();
        let cleaned_website = normalize_website(website);
        let mut result = ToolMatch {
            tool_name: tool_name.to_string(),
            website: website.to_string(),
            cleaned_website,
            groups: Vec::new(),
        };

        for lookup in LOOKUP_ORDER {
            let groups = self.lookup(lookup, tool_name, &result.cleaned_website);
            if !groups.is_empty() {
                tracing::info!(
                    "Found {} matches by {} for '{}'",
                    groups.len(),
                    lookup,
                    tool_name
                );
                result.groups = groups;
                return result;
            }
        }

        tracing::info!(
            "No CPE matches found for tool: {}, website: {}",
            tool_name,
            website
        );
        result
    }

    fn lookup(&self, lookup: Provenance, tool_name: &str, cleaned_website: &str) -> Vec<MatchGroup> {
        let query = match lookup {
            Provenance::Website => cleaned_website,
            Provenance::Name => tool_name,
        };
        if query.is_empty() {
            return Vec::new();
        }

        tracing::debug!("Searching by {}: {}", lookup, query);
        let results = match lookup {
            Provenance::Website => self.search.search_by_website(query, self.result_size),
            Provenance::Name => self.search.search_by_name(query, self.result_size),
        };
        results.map_or_else(Vec::new, |r| group_hits(&r.hits, lookup))
    }
}
