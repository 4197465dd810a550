//! In-memory `VectorStore` used by unit tests.
//!
//! Distance is 0.0 for an exact text match and grows with the length
//! difference otherwise, which is enough to check ordering and formatting
//! without a Chroma server.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{Collection, Metadata, NewDocuments, Query, QueryMatches, VectorStore};
use crate::error::{StoreError, StoreResult};

struct FakeCollection {
    collection: Collection,
    entries: Vec<(String, String, Option<Metadata>)>,
}

#[derive(Default)]
pub struct FakeStore {
    collections: Mutex<BTreeMap<String, FakeCollection>>,
    next_id: Mutex<u64>,
    /// Drop `distances` and `metadatas` from query output.
    bare_queries: bool,
    /// Make `count` fail for every collection.
    failing_count: bool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bare_queries() -> Self {
        Self {
            bare_queries: true,
            ..Self::default()
        }
    }

    pub fn with_failing_count() -> Self {
        Self {
            failing_count: true,
            ..Self::default()
        }
    }

    fn with_collection<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut FakeCollection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut collections = self.collections.lock().unwrap();
        let entry = collections
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        f(entry)
    }
}

fn distance(a: &str, b: &str) -> f64 {
    if a == b {
        0.0
    } else {
        1.0 + (a.len() as f64 - b.len() as f64).abs()
    }
}

fn matches_filter(metadata: &Option<Metadata>, filter: &Option<Value>) -> bool {
    let Some(Value::Object(filter)) = filter else {
        return true;
    };
    let Some(metadata) = metadata else {
        return filter.is_empty();
    };
    filter
        .iter()
        .all(|(key, expected)| metadata.get(key) == Some(expected))
}

#[async_trait]
impl VectorStore for FakeStore {
    async fn create_collection(&self, name: &str, metadata: Metadata) -> StoreResult<Collection> {
        if metadata.is_empty() {
            return Err(StoreError::backend("create_collection", "metadata cannot be empty"));
        }
        let mut collections = self.collections.lock().unwrap();
        if collections.contains_key(name) {
            return Err(StoreError::backend(
                "create_collection",
                format!("Collection {} already exists", name),
            ));
        }
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("fake-{}", *next)
        };
        let collection = Collection {
            id,
            name: name.to_string(),
            metadata: Some(metadata),
        };
        collections.insert(
            name.to_string(),
            FakeCollection {
                collection: collection.clone(),
                entries: vec![],
            },
        );
        Ok(collection)
    }

    async fn get_collection(&self, name: &str) -> StoreResult<Collection> {
        self.with_collection(name, |c| Ok(c.collection.clone()))
    }

    async fn list_collections(&self) -> StoreResult<Vec<Collection>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections.values().map(|c| c.collection.clone()).collect())
    }

    async fn delete_collection(&self, name: &str) -> StoreResult<()> {
        let mut collections = self.collections.lock().unwrap();
        collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn add(&self, collection: &Collection, documents: NewDocuments) -> StoreResult<()> {
        self.with_collection(&collection.name, |c| {
            for (i, (id, doc)) in documents.ids.iter().zip(&documents.documents).enumerate() {
                if c.entries.iter().any(|(existing, _, _)| existing == id) {
                    return Err(StoreError::backend("add", format!("Duplicate id {}", id)));
                }
                let metadata = documents.metadatas.as_ref().and_then(|m| m.get(i).cloned());
                c.entries.push((id.clone(), doc.clone(), metadata));
            }
            Ok(())
        })
    }

    async fn query(&self, collection: &Collection, query: Query) -> StoreResult<QueryMatches> {
        self.with_collection(&collection.name, |c| {
            let mut documents: Vec<Option<Vec<Option<String>>>> = Vec::new();
            let mut distances: Vec<Option<Vec<Option<f64>>>> = Vec::new();
            let mut metadatas: Vec<Option<Vec<Option<Metadata>>>> = Vec::new();
            for text in &query.texts {
                let mut ranked: Vec<_> = c
                    .entries
                    .iter()
                    .filter(|(_, _, m)| matches_filter(m, &query.filter))
                    .map(|(_, doc, m)| (distance(text, doc), doc.clone(), m.clone()))
                    .collect();
                ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
                ranked.truncate(query.n_results);
                distances.push(Some(ranked.iter().map(|r| Some(r.0)).collect()));
                metadatas.push(Some(ranked.iter().map(|r| r.2.clone()).collect()));
                documents.push(Some(ranked.into_iter().map(|r| Some(r.1)).collect()));
            }
            Ok(QueryMatches {
                documents: Some(documents),
                distances: (!self.bare_queries).then_some(distances),
                metadatas: (!self.bare_queries).then_some(metadatas),
            })
        })
    }

    async fn count(&self, collection: &Collection) -> StoreResult<usize> {
        if self.failing_count {
            return Err(StoreError::backend("count", "count unavailable"));
        }
        self.with_collection(&collection.name, |c| Ok(c.entries.len()))
    }
}
