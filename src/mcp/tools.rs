//! Static tool catalogue advertised by `tools/list`.

use serde::Serialize;
use serde_json::{json, Value};

use crate::dispatcher::Operation;

/// One tool as advertised to MCP clients.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// All six tools, in catalogue order.
pub fn list_tools() -> Vec<ToolDefinition> {
    Operation::ALL.into_iter().map(definition).collect()
}

fn definition(op: Operation) -> ToolDefinition {
    let (description, input_schema) = match op {
        Operation::CreateCollection => (
            "Create a new Chroma collection",
            json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the collection to create"
                    },
                    "metadata": {
                        "type": "object",
                        "description": "Optional metadata for the collection"
                    }
                },
                "required": ["name"]
            }),
        ),
        Operation::AddDocuments => (
            "Add documents to a Chroma collection",
            json!({
                "type": "object",
                "properties": {
                    "collection_name": {
                        "type": "string",
                        "description": "Name of the collection"
                    },
                    "documents": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of documents to add"
                    },
                    "metadatas": {
                        "type": "array",
                        "items": { "type": "object" },
                        "description": "Optional metadata for each document"
                    },
                    "ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional IDs for each document"
                    }
                },
                "required": ["collection_name", "documents"]
            }),
        ),
        Operation::QueryCollection => (
            "Query a Chroma collection using semantic search",
            json!({
                "type": "object",
                "properties": {
                    "collection_name": {
                        "type": "string",
                        "description": "Name of the collection to query"
                    },
                    "query_texts": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of query texts"
                    },
                    "n_results": {
                        "type": "integer",
                        "description": "Number of results to return",
                        "default": 10,
                        "minimum": 1
                    },
                    "where": {
                        "type": "object",
                        "description": "Optional metadata filter"
                    }
                },
                "required": ["collection_name", "query_texts"]
            }),
        ),
        Operation::ListCollections => (
            "List all Chroma collections",
            json!({
                "type": "object",
                "properties": {}
            }),
        ),
        Operation::DeleteCollection => (
            "Delete a Chroma collection",
            json!({
                "type": "object",
                "properties": {
                    "collection_name": {
                        "type": "string",
                        "description": "Name of the collection to delete"
                    }
                },
                "required": ["collection_name"]
            }),
        ),
        Operation::GetCollectionInfo => (
            "Get information about a specific collection",
            json!({
                "type": "object",
                "properties": {
                    "collection_name": {
                        "type": "string",
                        "description": "Name of the collection"
                    }
                },
                "required": ["collection_name"]
            }),
        ),
    };

    ToolDefinition {
        name: op.name(),
        description,
        input_schema,
    }
}
