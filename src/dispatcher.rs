//! Request dispatcher.
//!
//! Maps an operation name to its handler and turns every failure into a
//! `success: false` envelope. Both transports go through [`Dispatcher::dispatch`].

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{OperationError, OperationResult, StoreResult};
use crate::handlers::{collections, documents, Response};
use crate::store::chroma::ChromaStore;
use crate::store::embedding::OpenAiEmbedder;
use crate::store::VectorStore;

/// The six operations exposed by both transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateCollection,
    AddDocuments,
    QueryCollection,
    ListCollections,
    DeleteCollection,
    GetCollectionInfo,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::CreateCollection,
        Operation::AddDocuments,
        Operation::QueryCollection,
        Operation::ListCollections,
        Operation::DeleteCollection,
        Operation::GetCollectionInfo,
    ];

    /// Exact-match lookup by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateCollection => "create_collection",
            Operation::AddDocuments => "add_documents",
            Operation::QueryCollection => "query_collection",
            Operation::ListCollections => "list_collections",
            Operation::DeleteCollection => "delete_collection",
            Operation::GetCollectionInfo => "get_collection_info",
        }
    }
}

/// Owns the store handle for the life of the process.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn VectorStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Build the embedder and connect to Chroma. Any failure here is fatal
    /// for the process.
    pub async fn connect(config: &ServerConfig) -> StoreResult<Self> {
        let timeout = Duration::from_secs(config.chroma.timeout_secs);
        let embedder = OpenAiEmbedder::new(config.embedding.clone(), timeout)?;
        let store = ChromaStore::initialize(&config.chroma, Box::new(embedder)).await?;
        info!(
            collection = %config.collection_name,
            "Dispatcher ready"
        );
        Ok(Self::new(Arc::new(store)))
    }

    /// Run one operation. Never fails: errors come back as failure envelopes.
    pub async fn dispatch(&self, name: &str, args: &Value) -> Response {
        let result = match Operation::from_name(name) {
            Some(op) => self.run(op, args).await,
            None => Err(OperationError::UnknownOperation(name.to_string())),
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                warn!(operation = name, kind = ?e.kind(), "Operation failed: {}", e);
                Response::from(e)
            }
        }
    }

    async fn run(&self, op: Operation, args: &Value) -> OperationResult<Response> {
        info!(operation = op.name(), "Dispatching");
        let store = self.store.as_ref();
        match op {
            Operation::CreateCollection => collections::create_collection(store, args).await,
            Operation::AddDocuments => documents::add_documents(store, args).await,
            Operation::QueryCollection => documents::query_collection(store, args).await,
            Operation::ListCollections => collections::list_collections(store, args).await,
            Operation::DeleteCollection => collections::delete_collection(store, args).await,
            Operation::GetCollectionInfo => collections::get_collection_info(store, args).await,
        }
    }
}
