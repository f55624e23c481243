//! Search backend response types.
//!
//! These types model the Elasticsearch-compatible REST responses the catalog
//! relies on: `_search` (including scroll pages and aggregations), `_bulk`,
//! `_count` and the root info endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of a `_search` or `_search/scroll` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Scroll cursor, only present for scroll requests
    #[serde(rename = "_scroll_id", default, skip_serializing_if = "Option::is_none")]
    pub scroll_id: Option<String>,

    #[serde(default)]
    pub hits: HitsEnvelope,

    /// Raw aggregation tree, when the query requested aggregations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,
}

/// The `hits` object of a search response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<TotalHits>,

    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Total hit count; older servers return a bare number, newer ones an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    pub const fn value(self) -> u64 {
        match self {
            Self::Count(n) | Self::Object { value: n } => n,
        }
    }
}

/// A single search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// One bucket of a terms aggregation.
#[derive(Debug, Clone, Deserialize)]
pub struct TermsBucket {
    pub key: Value,
    #[serde(default)]
    pub key_as_string: Option<String>,
    #[serde(default)]
    pub doc_count: u64,
}

impl TermsBucket {
    /// Display key; boolean fields report `1`/`0` keys with a string form.
    pub fn label(&self) -> String {
        if let Some(label) = &self.key_as_string {
            return label.clone();
        }
        match &self.key {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl SearchResponse {
    /// Total hit count, falling back to the number of returned hits.
    pub fn total(&self) -> u64 {
        self.hits
            .total
            .map_or(self.hits.hits.len() as u64, TotalHits::value)
    }

    /// Raw `_source` documents in rank order.
    pub fn sources(&self) -> impl Iterator<Item = &Value> {
        self.hits.hits.iter().map(|h| &h.source)
    }

    /// Buckets of a terms aggregation found by walking `path` through the
    /// aggregation tree (e.g. `["ref_types", "types"]` for a nested
    /// aggregation). Missing paths yield an empty list.
    pub fn terms_buckets(&self, path: &[&str]) -> Vec<TermsBucket> {
        let Some(mut node) = self.aggregations.as_ref() else {
            return Vec::new();
        };
        for key in path {
            match node.get(*key) {
                Some(child) => node = child,
                None => return Vec::new(),
            }
        }
        node.get("buckets")
            .cloned()
            .and_then(|b| serde_json::from_value(b).ok())
            .unwrap_or_default()
    }
}

/// Response of a `_bulk` request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<Value>,
}

impl BulkResponse {
    /// Number of items acknowledged with a 2xx status.
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item_ok(item)).count()
    }

    /// First error reason, for logging.
    pub fn first_error(&self) -> Option<String> {
        self.items
            .iter()
            .filter_map(|item| item.as_object()?.values().next())
            .find_map(|action| action.get("error"))
            .map(|err| {
                err.get("reason")
                    .and_then(Value::as_str)
                    .map_or_else(|| err.to_string(), str::to_string)
            })
    }
}

fn item_ok(item: &Value) -> bool {
    item.as_object()
        .and_then(|obj| obj.values().next())
        .and_then(|action| action.get("status"))
        .and_then(Value::as_u64)
        .is_some_and(|status| (200..300).contains(&status))
}

/// Response of a `_count` request.
#[derive(Debug, Clone, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Response of the root endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendInfo {
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub version: BackendVersion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendVersion {
    #[serde(default)]
    pub number: String,
}
