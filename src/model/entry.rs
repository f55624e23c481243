//! Catalog entry records.

use serde::{Deserialize, Serialize};

use super::cpe::CpeName;

/// One CPE dictionary record as stored in the backend and in backups.
///
/// Field names follow the feed (`cpeName`, `lastModified`, ...) so the same
/// document shape is used for indexing, export and backup files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Unique identifier string (`cpe:2.3:...`)
    pub cpe_name: String,
    /// Opaque upstream identifier
    #[serde(default)]
    pub cpe_name_id: String,
    /// Creation timestamp, ISO-8601
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last modification timestamp, ISO-8601
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    /// Display titles in upstream order
    #[serde(default)]
    pub titles: Vec<Title>,
    /// Reference links in upstream order
    #[serde(default)]
    pub refs: Vec<Reference>,
}

/// Localized display title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Title {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    pub title: String,
}

/// Reference link with its type tag (`Vendor`, `Product`, `Advisory`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "ref")]
    pub url: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<String>,
}

impl CatalogEntry {
    /// Create an entry with only its identifier set.
    pub fn new(cpe_name: impl Into<String>) -> Self {
        Self {
            cpe_name: cpe_name.into(),
            cpe_name_id: String::new(),
            created: None,
            last_modified: None,
            deprecated: false,
            titles: Vec::new(),
            refs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.cpe_name_id = id.into();
        self
    }

    #[must_use]
    pub fn with_last_modified(mut self, timestamp: impl Into<String>) -> Self {
        self.last_modified = Some(timestamp.into());
        self
    }

    #[must_use]
    pub const fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    #[must_use]
    pub fn with_title(mut self, lang: impl Into<String>, title: impl Into<String>) -> Self {
        self.titles.push(Title {
            lang: Some(lang.into()),
            title: title.into(),
        });
        self
    }

    #[must_use]
    pub fn with_ref(mut self, url: impl Into<String>, ref_type: impl Into<String>) -> Self {
        self.refs.push(Reference {
            url: url.into(),
            ref_type: Some(ref_type.into()),
        });
        self
    }

    /// First title, or an empty string.
    pub fn first_title(&self) -> &str {
        self.titles.first().map_or("", |t| t.title.as_str())
    }

    /// Reference URLs in upstream order.
    pub fn reference_urls(&self) -> impl Iterator<Item = &str> {
        self.refs.iter().map(|r| r.url.as_str())
    }

    /// Parsed identifier, if well-formed.
    pub fn parsed_name(&self) -> Option<CpeName> {
        CpeName::parse(&self.cpe_name).ok()
    }

    /// Component of the identifier by position, empty when absent.
    pub fn name_component(&self, index: usize) -> &str {
        self.cpe_name.split(':').nth(index).unwrap_or("")
    }

    /// True when any tracked field (`lastModified`, `deprecated`, `titles`,
    /// `refs`) differs. List comparison is order-sensitive.
    pub fn tracked_fields_differ(&self, other: &Self) -> bool {
        self.last_modified != other.last_modified
            || self.deprecated != other.deprecated
            || self.titles != other.titles
            || self.refs != other.refs
    }
}
