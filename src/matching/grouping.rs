//! Collapse raw search hits into vendor/product groups.
//!
//! The catalog holds one record per concrete version, so a lookup for a tool
//! typically returns many near-identical rows. Grouping reduces them to one
//! [`MatchGroup`] per vendor/product with the observed versions attached.

use indexmap::IndexMap;
use std::collections::BTreeSet;

use crate::model::{CatalogEntry, CpeName, MatchGroup, Provenance, WILDCARD};

/// Hits accumulated for one vendor/product pair.
struct Bucket<'a> {
    first: &'a CatalogEntry,
    first_name: CpeName,
    versions: BTreeSet<String>,
    names: Vec<String>,
}

impl<'a> Bucket<'a> {
    fn new(first: &'a CatalogEntry, first_name: CpeName) -> Self {
        Self {
            first,
            first_name,
            versions: BTreeSet::new(),
            names: Vec::new(),
        }
    }

    fn add(&mut self, entry: &CatalogEntry, name: &CpeName) {
        self.versions.insert(name.version().to_string());
        if !self.names.contains(&entry.cpe_name) {
            self.names.push(entry.cpe_name.clone());
        }
    }

    fn into_group(self, vendor: String, product: String, found_by: Provenance) -> MatchGroup {
        let consolidated =
            self.versions.len() > 1 || self.versions.iter().any(|v| v == WILDCARD);
        let cpe = if consolidated {
            self.first_name.with_wildcard_version().to_string()
        } else {
            self.first.cpe_name.clone()
        };
        MatchGroup {
            vendor,
            product,
            cpe,
            versions: self.versions.into_iter().collect(),
            cpe_names: self.names,
            sample: self.first.clone(),
            found_by,
        }
    }
}

/// Group `hits` by vendor/product.
///
/// Deprecated hits and identifiers with fewer than six components are
/// skipped. Groups come out in the order their first hit was ranked.
pub fn group_hits(hits: &[CatalogEntry], found_by: Provenance) -> Vec<MatchGroup> {
    let mut buckets: IndexMap<(String, String), Bucket<'_>> = IndexMap::new();

    for hit in hits {
        if hit.deprecated {
            continue;
        }
        let name = match CpeName::parse(&hit.cpe_name) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!("Skipping hit {}: {}", hit.cpe_name, e);
                continue;
            }
        };
        let key = (name.vendor().to_string(), name.product().to_string());
        let bucket = buckets
            .entry(key)
            .or_insert_with(|| Bucket::new(hit, name.clone()));
        bucket.add(hit, &name);
    }

    buckets
        .into_iter()
        .map(|((vendor, product), bucket)| bucket.into_group(vendor, product, found_by))
        .collect()
}
