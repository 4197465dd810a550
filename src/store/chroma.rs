//! Chroma REST client.
//!
//! Talks to the Chroma v2 HTTP API:
//! - `GET    /api/v2/heartbeat`
//! - `POST   /api/v2/reset`
//! - `GET    /api/v2/tenants/{tenant}/databases/{db}/collections[/{name}]`
//! - `POST   /api/v2/tenants/{tenant}/databases/{db}/collections`
//! - `DELETE /api/v2/tenants/{tenant}/databases/{db}/collections/{name}`
//! - `POST   .../collections/{id}/add`, `.../query`, `GET .../count`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use super::embedding::Embedder;
use super::{Collection, Metadata, NewDocuments, Query, QueryMatches, VectorStore};
use crate::config::ChromaConfig;
use crate::error::{StoreError, StoreResult};

const QUERY_INCLUDE: [&str; 3] = ["documents", "metadatas", "distances"];

pub struct ChromaStore {
    client: Client,
    base: Url,
    tenant: String,
    database: String,
    allow_reset: bool,
    embedder: Box<dyn Embedder>,
}

impl ChromaStore {
    /// Connect to the Chroma server described by `config`.
    ///
    /// Creates the persistence directory first, then checks the server with a
    /// heartbeat. When `reset_on_start` is set (and resets are allowed) the
    /// database is wiped once after connecting.
    pub async fn initialize(
        config: &ChromaConfig,
        embedder: Box<dyn Embedder>,
    ) -> StoreResult<Self> {
        tokio::fs::create_dir_all(&config.persist_directory)
            .await
            .map_err(|e| {
                StoreError::Init(format!(
                    "Failed to create persist directory {}: {}",
                    config.persist_directory.display(),
                    e
                ))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Init(format!("Failed to create HTTP client: {}", e)))?;

        let base = Url::parse(&config.base_url())
            .map_err(|e| StoreError::Init(format!("Invalid Chroma URL: {}", e)))?;

        let store = Self {
            client,
            base,
            tenant: config.tenant.clone(),
            database: config.database.clone(),
            allow_reset: config.allow_reset,
            embedder,
        };

        store
            .heartbeat()
            .await
            .map_err(|e| StoreError::Init(e.to_string()))?;

        info!(
            url = %store.base,
            persist_directory = %config.persist_directory.display(),
            anonymized_telemetry = config.anonymized_telemetry,
            allow_reset = config.allow_reset,
            "Chroma client initialized"
        );

        if config.reset_on_start {
            store.reset().await?;
        }

        Ok(store)
    }

    pub async fn heartbeat(&self) -> StoreResult<Value> {
        let url = self.api_url(&["heartbeat"])?;
        self.send("heartbeat", "", self.client.get(url)).await
    }

    /// Delete every collection in the server. Refused unless resets are allowed.
    pub async fn reset(&self) -> StoreResult<()> {
        if !self.allow_reset {
            return Err(StoreError::backend("reset", "reset is disabled (allow_reset=false)"));
        }
        let url = self.api_url(&["reset"])?;
        self.send("reset", "", self.client.post(url)).await?;
        warn!("Chroma database reset");
        Ok(())
    }

    fn api_url(&self, tail: &[&str]) -> StoreResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Init(format!("Invalid Chroma URL: {}", self.base)))?
            .pop_if_empty()
            .extend(["api", "v2"])
            .extend(tail);
        Ok(url)
    }

    fn collections_url(&self, tail: &[&str]) -> StoreResult<Url> {
        let mut segments = vec![
            "tenants",
            self.tenant.as_str(),
            "databases",
            self.database.as_str(),
            "collections",
        ];
        segments.extend_from_slice(tail);
        self.api_url(&segments)
    }

    /// Send a request and decode the JSON body. `subject` names the collection
    /// used for not-found reporting.
    async fn send(
        &self,
        operation: &'static str,
        subject: &str,
        request: RequestBuilder,
    ) -> StoreResult<Value> {
        debug!(operation, subject, "Chroma request");

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                StoreError::backend(
                    operation,
                    format!("Cannot connect to Chroma at {}. Is it running?", self.base),
                )
            } else if e.is_timeout() {
                StoreError::backend(operation, "Request timed out")
            } else {
                StoreError::backend(operation, format!("HTTP request failed: {}", e))
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::backend(operation, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(classify_failure(operation, subject, status.as_u16(), &text));
        }

        if text.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str(&text)
                .map_err(|e| StoreError::backend(operation, format!("Invalid JSON response: {}", e)))
        }
    }
}

/// Map a failed HTTP exchange onto the store error taxonomy.
fn classify_failure(operation: &'static str, subject: &str, status: u16, body: &str) -> StoreError {
    let message = error_message(body);
    let missing = status == 404
        || message.contains("does not exist")
        || message.contains("NotFoundError");
    if missing && !subject.is_empty() {
        StoreError::NotFound(subject.to_string())
    } else {
        StoreError::backend(operation, format!("{} - {}", status, message))
    }
}

/// Pull the human-readable part out of a Chroma error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            let kind = map.get("error").and_then(|v| v.as_str()).unwrap_or("");
            let message = map.get("message").and_then(|v| v.as_str()).unwrap_or("");
            match (kind.is_empty(), message.is_empty()) {
                (false, false) => format!("{}: {}", kind, message),
                (false, true) => kind.to_string(),
                (true, false) => message.to_string(),
                (true, true) => body.to_string(),
            }
        }
        _ => body.to_string(),
    }
}

fn decode<T: serde::de::DeserializeOwned>(operation: &'static str, value: Value) -> StoreResult<T> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::backend(operation, format!("Unexpected response: {}", e)))
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn create_collection(&self, name: &str, metadata: Metadata) -> StoreResult<Collection> {
        let url = self.collections_url(&[])?;
        let body = json!({
            "name": name,
            "metadata": metadata,
            "get_or_create": false,
        });
        // Not-found does not apply to creation; pass no subject.
        let value = self
            .send("create_collection", "", self.client.post(url).json(&body))
            .await?;
        decode("create_collection", value)
    }

    async fn get_collection(&self, name: &str) -> StoreResult<Collection> {
        let url = self.collections_url(&[name])?;
        let value = self.send("get_collection", name, self.client.get(url)).await?;
        decode("get_collection", value)
    }

    async fn list_collections(&self) -> StoreResult<Vec<Collection>> {
        let url = self.collections_url(&[])?;
        let value = self.send("list_collections", "", self.client.get(url)).await?;
        decode("list_collections", value)
    }

    async fn delete_collection(&self, name: &str) -> StoreResult<()> {
        let url = self.collections_url(&[name])?;
        self.send("delete_collection", name, self.client.delete(url))
            .await?;
        Ok(())
    }

    async fn add(&self, collection: &Collection, documents: NewDocuments) -> StoreResult<()> {
        let embeddings = self.embedder.embed(&documents.documents).await?;

        let mut body = json!({
            "ids": documents.ids,
            "embeddings": embeddings,
            "documents": documents.documents,
        });
        if let Some(metadatas) = documents.metadatas {
            body["metadatas"] = json!(metadatas);
        }

        let url = self.collections_url(&[collection.id.as_str(), "add"])?;
        self.send("add", &collection.name, self.client.post(url).json(&body))
            .await?;
        Ok(())
    }

    async fn query(&self, collection: &Collection, query: Query) -> StoreResult<QueryMatches> {
        let embeddings = self.embedder.embed(&query.texts).await?;

        let mut body = json!({
            "query_embeddings": embeddings,
            "n_results": query.n_results,
            "include": QUERY_INCLUDE,
        });
        if let Some(filter) = query.filter {
            body["where"] = filter;
        }

        let url = self.collections_url(&[collection.id.as_str(), "query"])?;
        let value = self
            .send("query", &collection.name, self.client.post(url).json(&body))
            .await?;
        decode("query", value)
    }

    async fn count(&self, collection: &Collection) -> StoreResult<usize> {
        let url = self.collections_url(&[collection.id.as_str(), "count"])?;
        let value = self
            .send("count", &collection.name, self.client.get(url))
            .await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| StoreError::backend("count", format!("Unexpected response: {}", value)))
    }
}
