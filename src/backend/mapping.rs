//! Index mapping for catalog documents.

use serde_json::{json, Value};

/// Mapping used when creating the catalog index.
///
/// `titles` and `refs` are nested so a title/URL clause only matches within
/// one list element. `titles.title` is analysed text with a `keyword`
/// sub-field for exact term matches.
pub fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "cpeName": { "type": "keyword" },
                "cpeNameId": { "type": "keyword" },
                "created": { "type": "date" },
                "lastModified": { "type": "date" },
                "deprecated": { "type": "boolean" },
                "refs": {
                    "type": "nested",
                    "properties": {
                        "ref": { "type": "keyword" },
                        "type": { "type": "keyword" }
                    }
                },
                "titles": {
                    "type": "nested",
                    "properties": {
                        "lang": { "type": "keyword" },
                        "title": {
                            "type": "text",
                            "analyzer": "standard",
                            "fields": {
                                "keyword": { "type": "keyword", "ignore_above": 256 },
                                "raw": { "type": "keyword" }
                            }
                        }
                    }
                }
            }
        }
    })
}
