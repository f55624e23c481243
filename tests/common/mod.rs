//! Shared fixtures for integration tests.
//!
//! [`FakeBackend`] keeps indexed documents in memory and replays scripted
//! search responses; [`FakeFeed`] serves chunk files written to a temp dir.

#![allow(dead_code)]

use cpe_catalog::backend::{BackendInfo, SearchResponse};
use cpe_catalog::error::{BackendErrorKind, CatalogError, FeedErrorKind, Result};
use cpe_catalog::{CatalogEntry, FeedSource, SearchBackend};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

// ============================================================================
// Entries
// ============================================================================

pub fn entry(name: &str) -> CatalogEntry {
    CatalogEntry::new(name)
        .with_last_modified("2024-01-01T00:00:00.000")
        .with_title("en", name)
}

pub fn cpe(vendor: &str, product: &str, version: &str) -> String {
    format!("cpe:2.3:a:{vendor}:{product}:{version}:*:*:*:*:*:*:*")
}

/// A search response carrying `entries` as hits.
pub fn hits(entries: &[CatalogEntry]) -> SearchResponse {
    let docs: Vec<Value> = entries
        .iter()
        .map(|e| json!({ "_source": serde_json::to_value(e).unwrap() }))
        .collect();
    serde_json::from_value(json!({
        "hits": { "total": { "value": entries.len() }, "hits": docs }
    }))
    .unwrap()
}

fn backend_failure(operation: &str) -> CatalogError {
    CatalogError::backend(
        operation,
        BackendErrorKind::NetworkError("connection refused".to_string()),
    )
}

// ============================================================================
// Backend
// ============================================================================

/// In-memory search backend.
#[derive(Default)]
pub struct FakeBackend {
    pub docs: RefCell<Vec<CatalogEntry>>,
    pub responses: RefCell<VecDeque<Result<SearchResponse>>>,
    pub queries: RefCell<Vec<Value>>,
    pub deleted: Cell<bool>,
    pub fail_export: bool,
    pub fail_delete: bool,
    pub fail_create: bool,
    pub fail_bulk: bool,
}

impl FakeBackend {
    pub fn with_docs(docs: Vec<CatalogEntry>) -> Self {
        Self {
            docs: RefCell::new(docs),
            ..Self::default()
        }
    }

    /// Queue a response for the next `search` call.
    pub fn respond(&self, response: SearchResponse) {
        self.responses.borrow_mut().push_back(Ok(response));
    }

    /// Queue a failure for the next `search` call.
    pub fn respond_error(&self) {
        self.responses
            .borrow_mut()
            .push_back(Err(backend_failure("search")));
    }

    pub fn doc_names(&self) -> Vec<String> {
        self.docs.borrow().iter().map(|d| d.cpe_name.clone()).collect()
    }
}

impl SearchBackend for FakeBackend {
    fn info(&self) -> Result<BackendInfo> {
        Ok(BackendInfo::default())
    }

    fn index_exists(&self) -> Result<bool> {
        Ok(!self.deleted.get())
    }

    fn create_index(&self) -> Result<()> {
        if self.fail_create {
            return Err(backend_failure("create index"));
        }
        self.deleted.set(false);
        Ok(())
    }

    fn delete_index(&self) -> Result<()> {
        if self.fail_delete {
            return Err(backend_failure("delete index"));
        }
        self.docs.borrow_mut().clear();
        self.deleted.set(true);
        Ok(())
    }

    fn bulk_index(&self, entries: &[CatalogEntry]) -> Result<usize> {
        if self.fail_bulk {
            return Err(backend_failure("bulk"));
        }
        self.docs.borrow_mut().extend_from_slice(entries);
        Ok(entries.len())
    }

    fn refresh(&self) -> Result<()> {
        Ok(())
    }

    fn document_count(&self) -> Result<u64> {
        Ok(self.docs.borrow().len() as u64)
    }

    fn search(&self, query: &Value) -> Result<SearchResponse> {
        self.queries.borrow_mut().push(query.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchResponse::default()))
    }

    fn export_all(&self, _scroll_size: usize) -> Result<Vec<CatalogEntry>> {
        if self.fail_export {
            return Err(backend_failure("export"));
        }
        Ok(self.docs.borrow().clone())
    }
}

// ============================================================================
// Feed
// ============================================================================

/// Feed source serving chunk files from a directory.
pub struct FakeFeed {
    pub dir: PathBuf,
    pub fail_fetch: bool,
    pub fetched: Cell<bool>,
}

impl FakeFeed {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            fail_fetch: false,
            fetched: Cell::new(false),
        }
    }

    pub fn failing(dir: &Path) -> Self {
        Self {
            fail_fetch: true,
            ..Self::new(dir)
        }
    }
}

impl FeedSource for FakeFeed {
    fn fetch(&self, _force: bool) -> Result<()> {
        if self.fail_fetch {
            return Err(CatalogError::feed(
                "GET feed",
                FeedErrorKind::DownloadFailed("HTTP 503".to_string()),
            ));
        }
        self.fetched.set(true);
        Ok(())
    }

    fn chunk_files(&self) -> Result<Vec<PathBuf>> {
        cpe_catalog::feed::list_chunk_files(&self.dir, "nvdcpe-2.0-chunk-")
    }
}

/// Write a feed chunk file holding `entries` and return its path.
pub fn write_chunk(dir: &Path, index: usize, entries: &[CatalogEntry]) -> PathBuf {
    let products: Vec<Value> = entries
        .iter()
        .map(|e| json!({ "cpe": serde_json::to_value(e).unwrap() }))
        .collect();
    let body = json!({
        "resultsPerPage": entries.len(),
        "format": "NVD_CPE",
        "version": "2.0",
        "products": products
    });
    let path = dir.join(format!("nvdcpe-2.0-chunk-{index:05}.json"));
    std::fs::write(&path, serde_json::to_vec_pretty(&body).unwrap()).unwrap();
    path
}
