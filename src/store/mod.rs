//! Vector store facade.
//!
//! The dispatcher only talks to [`VectorStore`]. [`chroma::ChromaStore`]
//! implements it against a Chroma server; all indexing, ranking and
//! persistence happen there.

pub mod chroma;
pub mod embedding;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreResult;

/// String keys to scalar values, as accepted by Chroma.
pub type Metadata = Map<String, Value>;

/// A collection handle as reported by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Documents to add to a collection. `ids` and `metadatas`, when present,
/// hold one entry per document.
#[derive(Debug, Clone, Default)]
pub struct NewDocuments {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Option<Vec<Metadata>>,
}

/// A similarity query.
#[derive(Debug, Clone)]
pub struct Query {
    pub texts: Vec<String>,
    pub n_results: usize,
    pub filter: Option<Value>,
}

/// Raw query output: the outer index is the query, the inner index the
/// match, in the store's order (ascending distance).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryMatches {
    #[serde(default)]
    pub documents: Option<Vec<Option<Vec<Option<String>>>>>,
    #[serde(default)]
    pub distances: Option<Vec<Option<Vec<Option<f64>>>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Option<Vec<Option<Metadata>>>>>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn create_collection(&self, name: &str, metadata: Metadata) -> StoreResult<Collection>;

    /// Fails with `StoreError::NotFound` when no collection has this name.
    async fn get_collection(&self, name: &str) -> StoreResult<Collection>;

    async fn list_collections(&self) -> StoreResult<Vec<Collection>>;

    /// Fails with `StoreError::NotFound` when no collection has this name.
    async fn delete_collection(&self, name: &str) -> StoreResult<()>;

    async fn add(&self, collection: &Collection, documents: NewDocuments) -> StoreResult<()>;

    async fn query(&self, collection: &Collection, query: Query) -> StoreResult<QueryMatches>;

    async fn count(&self, collection: &Collection) -> StoreResult<usize>;
}
