//! Collection lifecycle handlers.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{parse_args, require_name, CollectionSummary, Payload, Response};
use crate::error::OperationResult;
use crate::store::{Collection, Metadata, VectorStore};

/// Marker metadata used when the caller supplies none; Chroma rejects empty maps.
pub const DEFAULT_METADATA_KEY: &str = "created_by";
pub const DEFAULT_METADATA_VALUE: &str = "chroma-mcp";

#[derive(Debug, Deserialize)]
struct CreateCollectionArgs {
    name: Option<String>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize)]
struct CollectionNameArgs {
    collection_name: Option<String>,
}

fn default_metadata() -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(DEFAULT_METADATA_KEY.into(), json!(DEFAULT_METADATA_VALUE));
    metadata
}

/// `create_collection` -- create a new, empty collection.
pub async fn create_collection(store: &dyn VectorStore, args: &Value) -> OperationResult<Response> {
    let args: CreateCollectionArgs = parse_args(args)?;
    let name = require_name(args.name, "Collection name is required")?;
    let metadata = args
        .metadata
        .filter(|m| !m.is_empty())
        .unwrap_or_else(default_metadata);

    let collection = store.create_collection(&name, metadata).await?;
    let count = store.count(&collection).await?;
    info!(collection = %name, id = %collection.id, "Created collection");

    Ok(
        Response::ok(format!("Successfully created collection '{}'", name)).payload(
            Payload::Created {
                collection_id: collection.id,
                count,
            },
        ),
    )
}

/// `list_collections` -- every collection with its document count.
///
/// A collection whose count fails is still listed, with `count: null` and
/// the store's message in `count_error`.
pub async fn list_collections(store: &dyn VectorStore, _args: &Value) -> OperationResult<Response> {
    let collections = store.list_collections().await?;

    let mut summaries = Vec::with_capacity(collections.len());
    for collection in collections {
        let (count, count_error) = match store.count(&collection).await {
            Ok(n) => (Some(n), None),
            Err(e) => {
                warn!(collection = %collection.name, "Unable to count collection: {}", e);
                (None, Some(e.to_string()))
            }
        };
        summaries.push(summarize(collection, count, count_error));
    }

    Ok(Response::with_payload(Payload::Listed {
        collections: summaries,
    }))
}

/// `delete_collection` -- remove a collection and all of its documents.
pub async fn delete_collection(store: &dyn VectorStore, args: &Value) -> OperationResult<Response> {
    let args: CollectionNameArgs = parse_args(args)?;
    let name = require_name(args.collection_name, "Collection name is required")?;

    store.delete_collection(&name).await?;
    info!(collection = %name, "Deleted collection");

    Ok(Response::ok(format!(
        "Successfully deleted collection '{}'",
        name
    )))
}

/// `get_collection_info` -- name, id, count and metadata of one collection.
pub async fn get_collection_info(
    store: &dyn VectorStore,
    args: &Value,
) -> OperationResult<Response> {
    let args: CollectionNameArgs = parse_args(args)?;
    let name = require_name(args.collection_name, "Collection name is required")?;

    let collection = store.get_collection(&name).await?;
    let count = store.count(&collection).await?;

    Ok(Response::with_payload(Payload::Info {
        collection: summarize(collection, Some(count), None),
    }))
}

fn summarize(
    collection: Collection,
    count: Option<usize>,
    count_error: Option<String>,
) -> CollectionSummary {
    CollectionSummary {
        name: collection.name,
        id: collection.id,
        count,
        count_error,
        metadata: collection.metadata.unwrap_or_default(),
    }
}
