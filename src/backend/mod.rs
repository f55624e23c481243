//! Search backend access.
//!
//! [`SearchBackend`] is the seam between the catalog logic and the index
//! server. [`ElasticClient`] talks to an Elasticsearch-compatible REST API;
//! tests substitute in-memory implementations.

mod client;
mod mapping;
mod response;

pub use client::{ElasticClient, ElasticClientConfig};
pub(crate) use client::decode_entries;
pub use mapping::index_mapping;
pub use response::{
    BackendInfo, BackendVersion, BulkResponse, CountResponse, Hit, HitsEnvelope, SearchResponse,
    TermsBucket, TotalHits,
};

use crate::error::Result;
use crate::model::CatalogEntry;
use serde_json::Value;

/// Default number of documents per bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Operations the catalog needs from its index server.
pub trait SearchBackend {
    /// Ping the server.
    fn info(&self) -> Result<BackendInfo>;

    fn index_exists(&self) -> Result<bool>;

    /// Create the catalog index with its mapping. Succeeds when the index
    /// already exists.
    fn create_index(&self) -> Result<()>;

    /// Delete the catalog index. Succeeds when it does not exist.
    fn delete_index(&self) -> Result<()>;

    /// Index a batch of entries, returning how many were accepted.
    fn bulk_index(&self, entries: &[CatalogEntry]) -> Result<usize>;

    /// Make recently indexed documents searchable.
    fn refresh(&self) -> Result<()>;

    fn document_count(&self) -> Result<u64>;

    /// Run a raw query against the catalog index.
    fn search(&self, query: &Value) -> Result<SearchResponse>;

    /// Every document in the index, paged `scroll_size` at a time.
    fn export_all(&self, scroll_size: usize) -> Result<Vec<CatalogEntry>>;
}

impl<T: SearchBackend + ?Sized> SearchBackend for &T {
    fn info(&self) -> Result<BackendInfo> {
        (**self).info()
    }
    fn index_exists(&self) -> Result<bool> {
        (**self).index_exists()
    }
    fn create_index(&self) -> Result<()> {
        (**self).create_index()
    }
    fn delete_index(&self) -> Result<()> {
        (**self).delete_index()
    }
    fn bulk_index(&self, entries: &[CatalogEntry]) -> Result<usize> {
        (**self).bulk_index(entries)
    }
    fn refresh(&self) -> Result<()> {
        (**self).refresh()
    }
    fn document_count(&self) -> Result<u64> {
        (**self).document_count()
    }
    fn search(&self, query: &Value) -> Result<SearchResponse> {
        (**self).search(query)
    }
    fn export_all(&self, scroll_size: usize) -> Result<Vec<CatalogEntry>> {
        (**self).export_all(scroll_size)
    }
}

/// Index `entries` in batches of `batch_size`.
///
/// A failed batch is logged and skipped; the return value is the number of
/// documents the backend acknowledged across all batches.
pub fn index_entries<B: SearchBackend + ?Sized>(
    backend: &B,
    entries: &[CatalogEntry],
    batch_size: usize,
) -> usize {
    let batch_size = batch_size.max(1);
    let mut total_indexed = 0;

    for (batch_no, batch) in entries.chunks(batch_size).enumerate() {
        match backend.bulk_index(batch) {
            Ok(indexed) => {
                total_indexed += indexed;
                tracing::debug!(
                    "Indexed batch {} ({} documents). Total: {}",
                    batch_no + 1,
                    indexed,
                    total_indexed
                );
            }
            Err(e) => {
                tracing::error!(
                    "Failed to index batch {} ({} documents starting at {}): {}",
                    batch_no + 1,
                    batch.len(),
                    batch.first().map_or("", |entry| entry.cpe_name.as_str()),
                    e
                );
            }
        }
    }

    if let Err(e) = backend.refresh() {
        tracing::warn!("Index refresh failed: {}", e);
    }
    tracing::info!("Total documents indexed: {}", total_indexed);
    total_indexed
}
