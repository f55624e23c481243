//! Elasticsearch-compatible HTTP client.

use super::mapping::index_mapping;
use super::response::{BackendInfo, BulkResponse, CountResponse, SearchResponse};
use super::SearchBackend;
use crate::config::BackendConfig;
use crate::error::{BackendErrorKind, CatalogError, Result};
use crate::model::CatalogEntry;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

/// How long a scroll context is kept alive between pages.
const SCROLL_KEEP_ALIVE: &str = "5m";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ElasticClientConfig {
    /// Base URL, e.g. `http://localhost:9200`
    pub base_url: String,
    /// Index holding the catalog
    pub index: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ElasticClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            index: "cpe".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&BackendConfig> for ElasticClientConfig {
    fn from(config: &BackendConfig) -> Self {
        Self {
            base_url: config.url(),
            index: config.index.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Blocking HTTP client for the catalog index.
pub struct ElasticClient {
    client: Client,
    config: ElasticClientConfig,
}

/// Helper to convert reqwest errors to backend errors
fn network_error(msg: &str, err: reqwest::Error) -> CatalogError {
    CatalogError::backend(msg, BackendErrorKind::NetworkError(err.to_string()))
}

/// Helper to create API errors
fn api_error(msg: impl Into<String>) -> CatalogError {
    CatalogError::backend("API request", BackendErrorKind::ApiError(msg.into()))
}

fn invalid_response(context: &str, err: impl std::fmt::Display) -> CatalogError {
    CatalogError::backend(
        context,
        BackendErrorKind::InvalidResponse(err.to_string()),
    )
}

impl ElasticClient {
    /// Create a new client.
    pub fn new(config: ElasticClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| network_error("Failed to create HTTP client", e))?;

        Ok(Self { client, config })
    }

    /// Create a client from the `backend` configuration section.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(ElasticClientConfig::from(config))
    }

    /// Name of the catalog index.
    pub fn index(&self) -> &str {
        &self.config.index
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn index_url(&self, path: &str) -> String {
        format!("{}/{}{}", self.base(), self.config.index, path)
    }

    fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        request
            .send()
            .map_err(|e| network_error(&format!("{what} request failed"), e))
    }

    /// Send a request and decode a successful JSON response.
    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = self.send(request, what)?;
        let response = ensure_success(response, what)?;
        response
            .json()
            .map_err(|e| invalid_response(&format!("parsing {what} response"), e))
    }
}

/// Turn a non-2xx response into an API error carrying the body.
fn ensure_success(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(api_error(format!(
        "{what} returned error status {}: {}",
        status.as_u16(),
        body
    )))
}

/// Build the NDJSON payload of a `_bulk` request. Documents are keyed by
/// `cpeName` so re-indexing the same identifier replaces it.
fn bulk_body(entries: &[CatalogEntry]) -> Result<String> {
    let mut body = String::new();
    for entry in entries {
        let action = json!({ "index": { "_id": entry.cpe_name } });
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(entry)?);
        body.push('\n');
    }
    Ok(body)
}

/// Decode `_source` documents, logging and skipping the ones that do not
/// map to a catalog entry.
pub(crate) fn decode_entries(response: &SearchResponse, context: &str) -> Vec<CatalogEntry> {
    response
        .sources()
        .filter_map(|source| match serde_json::from_value(source.clone()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping undecodable document in {}: {}", context, e);
                None
            }
        })
        .collect()
}

impl SearchBackend for ElasticClient {
    fn info(&self) -> Result<BackendInfo> {
        let info: BackendInfo =
            self.send_json(self.client.get(format!("{}/", self.base())), "info")?;
        tracing::info!(
            "Connected to search backend {} (version {})",
            info.cluster_name,
            info.version.number
        );
        Ok(info)
    }

    fn index_exists(&self) -> Result<bool> {
        let response = self.send(self.client.head(self.index_url("")), "index exists")?;
        match response.status().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(api_error(format!(
                "index exists check returned status {status}"
            ))),
        }
    }

    fn create_index(&self) -> Result<()> {
        if self.index_exists()? {
            tracing::info!("Index {} already exists", self.config.index);
            return Ok(());
        }
        let request = self.client.put(self.index_url("")).json(&index_mapping());
        ensure_success(self.send(request, "create index")?, "create index")?;
        tracing::info!("Created index {}", self.config.index);
        Ok(())
    }

    fn delete_index(&self) -> Result<()> {
        let response = self.send(self.client.delete(self.index_url("")), "delete index")?;
        if response.status().as_u16() == 404 {
            tracing::debug!("Index {} does not exist, nothing to delete", self.config.index);
            return Ok(());
        }
        ensure_success(response, "delete index")?;
        tracing::info!("Deleted index {}", self.config.index);
        Ok(())
    }

    fn bulk_index(&self, entries: &[CatalogEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }
        let request = self
            .client
            .post(self.index_url("/_bulk"))
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(bulk_body(entries)?);
        let response: BulkResponse = self.send_json(request, "bulk index")?;

        let indexed = response.succeeded();
        if response.errors {
            tracing::warn!(
                "Bulk request indexed {} of {} documents; first error: {}",
                indexed,
                entries.len(),
                response.first_error().unwrap_or_default()
            );
        }
        Ok(indexed)
    }

    fn refresh(&self) -> Result<()> {
        let response = self.send(self.client.post(self.index_url("/_refresh")), "refresh")?;
        ensure_success(response, "refresh")?;
        Ok(())
    }

    fn document_count(&self) -> Result<u64> {
        let count: CountResponse =
            self.send_json(self.client.get(self.index_url("/_count")), "count")?;
        Ok(count.count)
    }

    fn search(&self, query: &Value) -> Result<SearchResponse> {
        if !query.is_object() {
            return Err(CatalogError::backend(
                "search",
                BackendErrorKind::InvalidQuery("query must be a JSON object".to_string()),
            ));
        }
        let request = self.client.post(self.index_url("/_search")).json(query);
        self.send_json(request, "search")
    }

    fn export_all(&self, scroll_size: usize) -> Result<Vec<CatalogEntry>> {
        let first = self
            .client
            .post(self.index_url("/_search"))
            .query(&[("scroll", SCROLL_KEEP_ALIVE)])
            .json(&json!({ "query": { "match_all": {} }, "size": scroll_size.max(1) }));
        let mut page: SearchResponse = self.send_json(first, "scroll search")?;

        let mut entries = Vec::new();
        let mut scroll_id = page.scroll_id.clone();
        while !page.hits.hits.is_empty() {
            entries.extend(decode_entries(&page, "export"));
            let Some(id) = scroll_id.clone() else {
                break;
            };
            let next = self
                .client
                .post(format!("{}/_search/scroll", self.base()))
                .json(&json!({ "scroll": SCROLL_KEEP_ALIVE, "scroll_id": id }));
            page = self.send_json(next, "scroll")?;
            if page.scroll_id.is_some() {
                scroll_id = page.scroll_id.clone();
            }
        }

        if let Some(id) = scroll_id {
            let clear = self
                .client
                .delete(format!("{}/_search/scroll", self.base()))
                .json(&json!({ "scroll_id": [id] }));
            if let Err(e) = self
                .send(clear, "clear scroll")
                .and_then(|r| ensure_success(r, "clear scroll"))
            {
                tracing::warn!("Failed to clear scroll context: {}", e);
            }
        }

        tracing::info!("Retrieved {} documents from index", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::HEAD;

    fn client_for(server: &MockServer) -> ElasticClient {
        ElasticClient::new(ElasticClientConfig {
            base_url: server.base_url(),
            index: "cpe".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn doc(name: &str) -> Value {
        json!({
            "_id": name,
            "_source": { "cpeName": name, "cpeNameId": "id", "deprecated": false }
        })
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ElasticClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:9200");
        assert_eq!(config.index, "cpe");
    }

    #[test]
    fn test_info() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "cluster_name": "catalog",
                    "version": { "number": "8.11.0" }
                }));
        });

        let info = client_for(&server).info().unwrap();
        mock.assert();
        assert_eq!(info.version.number, "8.11.0");
    }

    #[test]
    fn test_index_exists_maps_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/cpe");
            then.status(404);
        });

        assert!(!client_for(&server).index_exists().unwrap());
    }

    #[test]
    fn test_create_index_skips_existing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/cpe");
            then.status(200);
        });
        let put = server.mock(|when, then| {
            when.method(PUT).path("/cpe");
            then.status(200).json_body(json!({ "acknowledged": true }));
        });

        client_for(&server).create_index().unwrap();
        put.assert_calls(0);
    }

    #[test]
    fn test_create_index_puts_mapping() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/cpe");
            then.status(404);
        });
        let put = server.mock(|when, then| {
            when.method(PUT).path("/cpe");
            then.status(200).json_body(json!({ "acknowledged": true }));
        });

        client_for(&server).create_index().unwrap();
        put.assert();
    }

    #[test]
    fn test_delete_missing_index_is_ok() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/cpe");
            then.status(404).json_body(json!({ "error": "index_not_found_exception" }));
        });

        assert!(client_for(&server).delete_index().is_ok());
    }

    #[test]
    fn test_bulk_index_counts_successes() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/cpe/_bulk");
            then.status(200).json_body(json!({
                "errors": true,
                "items": [
                    { "index": { "status": 201 } },
                    { "index": { "status": 400, "error": { "reason": "bad date" } } }
                ]
            }));
        });

        let entries = vec![
            CatalogEntry::new("cpe:2.3:a:acme:tool:1.0"),
            CatalogEntry::new("cpe:2.3:a:acme:tool:2.0"),
        ];
        assert_eq!(client_for(&server).bulk_index(&entries).unwrap(), 1);
        mock.assert();
    }

    #[test]
    fn test_search_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/cpe/_search");
            then.status(400).body("parsing_exception");
        });

        let err = client_for(&server)
            .search(&json!({ "query": { "match_all": {} } }))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Backend { .. }));
    }

    #[test]
    fn test_search_rejects_non_object_query() {
        let server = MockServer::start();
        let err = client_for(&server).search(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("search"));
    }

    #[test]
    fn test_export_all_scrolls_until_empty() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(POST)
                .path("/cpe/_search")
                .query_param("scroll", "5m");
            then.status(200).json_body(json!({
                "_scroll_id": "scroll-1",
                "hits": {
                    "total": { "value": 2 },
                    "hits": [doc("cpe:2.3:a:a:a:1"), doc("cpe:2.3:a:b:b:1")]
                }
            }));
        });
        let scroll = server.mock(|when, then| {
            when.method(POST).path("/_search/scroll");
            then.status(200).json_body(json!({
                "_scroll_id": "scroll-1",
                "hits": { "total": { "value": 2 }, "hits": [] }
            }));
        });
        let clear = server.mock(|when, then| {
            when.method(DELETE).path("/_search/scroll");
            then.status(200).json_body(json!({ "succeeded": true }));
        });

        let entries = client_for(&server).export_all(1000).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].cpe_name, "cpe:2.3:a:b:b:1");
        first.assert();
        scroll.assert();
        clear.assert();
    }

    #[test]
    fn test_unreachable_backend_is_network_error() {
        let client = ElasticClient::new(ElasticClientConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            index: "cpe".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        match client.document_count() {
            Err(CatalogError::Backend { source, .. }) => {
                assert!(matches!(source, BackendErrorKind::NetworkError(_)));
            }
            other => panic!("Expected backend error, got {other:?}"),
        }
    }

    #[test]
    fn test_bulk_body_is_ndjson() {
        let body = bulk_body(&[CatalogEntry::new("cpe:2.3:a:x:y:1")]).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"_id\":\"cpe:2.3:a:x:y:1\""));
        assert!(body.ends_with('\n'));
    }
}
