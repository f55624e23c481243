//! Index statistics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::backend::SearchResponse;

/// Document count plus aggregation breakdowns of the catalog index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatistics {
    pub total_documents: u64,
    /// `"true"`/`"false"` → count
    pub deprecated_breakdown: IndexMap<String, u64>,
    pub reference_types: IndexMap<String, u64>,
    pub languages: IndexMap<String, u64>,
}

impl IndexStatistics {
    /// Read the breakdowns out of a statistics aggregation response.
    pub fn from_response(total_documents: u64, response: &SearchResponse) -> Self {
        let collect = |path: &[&str]| -> IndexMap<String, u64> {
            response
                .terms_buckets(path)
                .into_iter()
                .map(|bucket| (bucket.label(), bucket.doc_count))
                .collect()
        };
        Self {
            total_documents,
            deprecated_breakdown: collect(&["deprecated_count"]),
            reference_types: collect(&["ref_types", "types"]),
            languages: collect(&["languages", "langs"]),
        }
    }

    pub fn deprecated_count(&self) -> u64 {
        self.deprecated_breakdown.get("true").copied().unwrap_or(0)
    }
}
