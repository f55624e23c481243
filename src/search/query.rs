//! Query builders for catalog searches.
//!
//! Every builder returns a complete request body for the backend's
//! `_search` endpoint. Boost weights encode the ranking contract: an exact
//! term match outranks an exact phrase match, and within the fuzzy tier a
//! fuzzy match outranks a prefix match, which outranks a substring match.

use serde_json::{json, Map, Value};

pub const EXACT_TERM_BOOST: f64 = 15.0;
pub const EXACT_PHRASE_BOOST: f64 = 10.0;
pub const FUZZY_BOOST: f64 = 5.0;
pub const PREFIX_BOOST: f64 = 4.0;
pub const SUBSTRING_BOOST: f64 = 3.0;

/// Default fuzziness passed to fuzzy `match` clauses.
pub const DEFAULT_FUZZINESS: &str = "AUTO";

/// Date field a range query may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateField {
    Created,
    #[default]
    LastModified,
}

impl DateField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::LastModified => "lastModified",
        }
    }
}

impl std::str::FromStr for DateField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "lastModified" | "last_modified" | "last-modified" => Ok(Self::LastModified),
            other => Err(format!("unknown date field '{other}'")),
        }
    }
}

fn nested(path: &str, query: Value) -> Value {
    json!({ "nested": { "path": path, "query": query } })
}

/// Exact tier: phrase and keyword-term match against nested titles.
pub fn exact_name_query(name: &str, size: usize) -> Value {
    json!({
        "query": nested("titles", json!({
            "bool": {
                "should": [
                    { "match_phrase": { "titles.title": { "query": name, "boost": EXACT_PHRASE_BOOST } } },
                    { "term": { "titles.title.keyword": { "value": name, "boost": EXACT_TERM_BOOST } } }
                ]
            }
        })),
        "size": size
    })
}

/// Fuzzy tier: fuzzy, prefix and substring match, ties broken by the most
/// recently modified entry.
pub fn fuzzy_name_query(name: &str, fuzziness: &str, size: usize) -> Value {
    let lower = name.to_lowercase();
    json!({
        "query": nested("titles", json!({
            "bool": {
                "should": [
                    { "match": { "titles.title": { "query": name, "fuzziness": fuzziness, "boost": FUZZY_BOOST } } },
                    { "wildcard": { "titles.title": { "value": format!("*{lower}*"), "boost": SUBSTRING_BOOST } } },
                    { "prefix": { "titles.title": { "value": lower, "boost": PREFIX_BOOST } } }
                ]
            }
        })),
        "size": size,
        "sort": [
            { "_score": { "order": "desc" } },
            { "lastModified": { "order": "desc" } }
        ]
    })
}

/// Substring match against nested reference URLs.
pub fn website_query(website: &str, size: usize) -> Value {
    json!({
        "query": nested("refs", json!({ "wildcard": { "refs.ref": format!("*{website}*") } })),
        "size": size
    })
}

pub fn exact_cpe_query(cpe_name: &str, size: usize) -> Value {
    json!({ "query": { "term": { "cpeName": cpe_name } }, "size": size })
}

pub fn cpe_pattern_query(pattern: &str, size: usize) -> Value {
    json!({ "query": { "wildcard": { "cpeName": pattern } }, "size": size })
}

/// Conjunction of positional wildcards on `cpeName`. `None` when no
/// component was given.
pub fn vendor_product_query(
    vendor: Option<&str>,
    product: Option<&str>,
    version: Option<&str>,
    size: usize,
) -> Option<Value> {
    let mut must = Vec::new();
    if let Some(vendor) = vendor.filter(|v| !v.is_empty()) {
        must.push(json!({ "wildcard": { "cpeName": format!("*:{vendor}:*") } }));
    }
    if let Some(product) = product.filter(|p| !p.is_empty()) {
        must.push(json!({ "wildcard": { "cpeName": format!("*:*:{product}:*") } }));
    }
    if let Some(version) = version.filter(|v| !v.is_empty()) {
        must.push(json!({ "wildcard": { "cpeName": format!("*:*:*:{version}:*") } }));
    }
    if must.is_empty() {
        return None;
    }
    Some(json!({ "query": { "bool": { "must": must } }, "size": size }))
}

pub fn deprecated_query(deprecated: bool, size: usize) -> Value {
    json!({ "query": { "term": { "deprecated": deprecated } }, "size": size })
}

/// Inclusive range on a date field. `None` when both bounds are missing.
pub fn date_range_query(
    start: Option<&str>,
    end: Option<&str>,
    field: DateField,
    size: usize,
) -> Option<Value> {
    let mut range = Map::new();
    if let Some(start) = start.filter(|s| !s.is_empty()) {
        range.insert("gte".to_string(), Value::from(start));
    }
    if let Some(end) = end.filter(|e| !e.is_empty()) {
        range.insert("lte".to_string(), Value::from(end));
    }
    if range.is_empty() {
        return None;
    }
    let mut field_range = Map::new();
    field_range.insert(field.as_str().to_string(), Value::Object(range));
    Some(json!({ "query": { "range": field_range }, "size": size }))
}

/// Aggregation-only query behind index statistics.
pub fn statistics_query() -> Value {
    json!({
        "size": 0,
        "track_total_hits": true,
        "aggs": {
            "deprecated_count": { "terms": { "field": "deprecated" } },
            "ref_types": {
                "nested": { "path": "refs" },
                "aggs": { "types": { "terms": { "field": "refs.type" } } }
            },
            "languages": {
                "nested": { "path": "titles" },
                "aggs": { "langs": { "terms": { "field": "titles.lang" } } }
            }
        }
    })
}

/// Add a default `size` to a caller-supplied query that has none.
pub fn with_default_size(mut query: Value, size: usize) -> Value {
    if let Some(obj) = query.as_object_mut() {
        obj.entry("size").or_insert_with(|| Value::from(size));
    }
    query
}
