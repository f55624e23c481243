//! Match groups: search hits collapsed to one logical product.

use serde::{Deserialize, Serialize};

use super::cpe::WILDCARD;
use super::entry::CatalogEntry;

/// Which lookup produced a match group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Matched by tool name
    Name,
    /// Matched by reference URL
    Website,
}

impl Provenance {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Website => "website",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog hits sharing one vendor/product pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchGroup {
    pub vendor: String,
    pub product: String,
    /// Representative identifier; the version is `*` when the group spans
    /// several versions or already carried a wildcard
    pub cpe: String,
    /// Distinct versions, sorted lexically
    pub versions: Vec<String>,
    /// Every identifier that collapsed into this group, first-seen order
    pub cpe_names: Vec<String>,
    /// First hit of the bucket
    pub sample: CatalogEntry,
    pub found_by: Provenance,
}

impl MatchGroup {
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// True when the representative stands for more than one concrete version.
    pub fn is_consolidated(&self) -> bool {
        self.versions.len() > 1 || self.versions.iter().any(|v| v == WILDCARD)
    }

    /// Versions joined with `|`, as written to the match output CSV.
    pub fn joined_versions(&self) -> String {
        self.versions.join("|")
    }

    /// Display title of the representative hit.
    pub fn title(&self) -> &str {
        self.sample.first_title()
    }

    /// The group as a single catalog entry keyed by its representative
    /// identifier.
    pub fn representative_entry(&self) -> CatalogEntry {
        let mut entry = self.sample.clone();
        entry.cpe_name = self.cpe.clone();
        entry
    }
}
