//! Document handlers: `add_documents` and `query_collection`.

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{parse_args, require_name, Payload, QueryHit, QueryResult, Response};
use crate::error::{OperationError, OperationResult};
use crate::store::{Metadata, NewDocuments, Query, QueryMatches, VectorStore};

pub const DEFAULT_N_RESULTS: usize = 10;

#[derive(Debug, Deserialize)]
struct AddDocumentsArgs {
    collection_name: Option<String>,
    #[serde(default)]
    documents: Option<Vec<String>>,
    #[serde(default)]
    metadatas: Option<Vec<Metadata>>,
    #[serde(default)]
    ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct QueryCollectionArgs {
    collection_name: Option<String>,
    #[serde(default)]
    query_texts: Option<Vec<String>>,
    #[serde(default)]
    n_results: Option<usize>,
    #[serde(default, rename = "where")]
    filter: Option<Value>,
}

/// `add_documents` -- embed and store documents in an existing collection.
///
/// Ids are generated (UUID v4) when the caller supplies none.
pub async fn add_documents(store: &dyn VectorStore, args: &Value) -> OperationResult<Response> {
    let args: AddDocumentsArgs = parse_args(args)?;
    let name = require_name(args.collection_name, "Collection name is required")?;
    let documents = args
        .documents
        .filter(|d| !d.is_empty())
        .ok_or_else(|| OperationError::validation("Documents are required"))?;

    let ids = match args.ids.filter(|ids| !ids.is_empty()) {
        Some(ids) => {
            check_len("ids", ids.len(), documents.len())?;
            ids
        }
        None => documents
            .iter()
            .map(|_| uuid::Uuid::new_v4().to_string())
            .collect(),
    };
    let metadatas = args.metadatas.filter(|m| !m.is_empty());
    if let Some(ref metadatas) = metadatas {
        check_len("metadatas", metadatas.len(), documents.len())?;
    }

    let collection = store.get_collection(&name).await?;
    let added = documents.len();
    store
        .add(
            &collection,
            NewDocuments {
                ids,
                documents,
                metadatas,
            },
        )
        .await?;
    info!(collection = %name, added, "Added documents");

    Ok(Response::ok(format!(
        "Successfully added {} documents to collection '{}'",
        added, name
    ))
    .payload(Payload::Added { count: added }))
}

/// `query_collection` -- nearest documents for each query text.
pub async fn query_collection(store: &dyn VectorStore, args: &Value) -> OperationResult<Response> {
    let args: QueryCollectionArgs = parse_args(args)?;
    let name = require_name(args.collection_name, "Collection name is required")?;
    let texts = args
        .query_texts
        .filter(|t| !t.is_empty())
        .ok_or_else(|| OperationError::validation("Query texts are required"))?;
    let n_results = args.n_results.unwrap_or(DEFAULT_N_RESULTS);
    if n_results == 0 {
        return Err(OperationError::validation("n_results must be at least 1"));
    }
    let filter = match args.filter {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) if map.is_empty() => None,
        Some(Value::Object(map)) => Some(Value::Object(map)),
        Some(_) => return Err(OperationError::validation("where must be an object")),
    };

    let collection = store.get_collection(&name).await?;
    let matches = store
        .query(
            &collection,
            Query {
                texts: texts.clone(),
                n_results,
                filter,
            },
        )
        .await?;
    info!(collection = %name, queries = texts.len(), n_results, "Queried collection");

    Ok(Response::with_payload(Payload::Queried {
        results: format_matches(&texts, matches),
    }))
}

fn check_len(field: &str, got: usize, expected: usize) -> OperationResult<()> {
    if got == expected {
        Ok(())
    } else {
        Err(OperationError::validation(format!(
            "{} must have one entry per document ({} given, {} documents)",
            field, got, expected
        )))
    }
}

/// Pair every returned document with the distance and metadata at the same
/// position. Queries keep input order, documents keep store order; a missing
/// distance or metadata list yields `null` for that field.
fn format_matches(texts: &[String], matches: QueryMatches) -> Vec<QueryResult> {
    let documents = matches.documents.unwrap_or_default();
    let distances = matches.distances.unwrap_or_default();
    let metadatas = matches.metadatas.unwrap_or_default();

    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let docs = documents.get(i).cloned().flatten().unwrap_or_default();
            let dists = distances.get(i).and_then(|d| d.as_ref());
            let metas = metadatas.get(i).and_then(|m| m.as_ref());

            let results = docs
                .into_iter()
                .enumerate()
                .map(|(j, document)| QueryHit {
                    document,
                    distance: dists.and_then(|d| d.get(j).copied().flatten()),
                    metadata: metas.and_then(|m| m.get(j).cloned().flatten()),
                })
                .collect();

            QueryResult {
                query: text.clone(),
                results,
            }
        })
        .collect()
}
