//! MCP (Model Context Protocol) tool server.
//!
//! Architecture:
//! - `server.rs` -- JSON-RPC 2.0 protocol handler (stdin/stdout)
//! - `tools.rs`  -- Static tool catalogue with JSON schemas
//!
//! Tool calls go through the shared [`Dispatcher`](crate::dispatcher::Dispatcher);
//! this module only renders the resulting envelopes as MCP text content.

pub mod server;
pub mod tools;

use serde::{Deserialize, Serialize};

use crate::handlers::{Payload, Response};

/// Result type returned for every tool call.
///
/// Matches the MCP protocol's tool result format:
/// ```json
/// {
///   "content": [{ "type": "text", "text": "..." }],
///   "isError": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolResult {
    pub content: Vec<McpContent>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

/// A single content item in an MCP tool result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum McpContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl McpToolResult {
    /// Create a successful text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Create an error text result.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
            is_error: true,
        }
    }
}

impl From<&Response> for McpToolResult {
    fn from(response: &Response) -> Self {
        if response.success {
            McpToolResult::text(render(response))
        } else {
            McpToolResult::error(format!(
                "Error: {}",
                response.message.as_deref().unwrap_or("operation failed")
            ))
        }
    }
}

/// Human-readable summary of a successful envelope.
fn render(response: &Response) -> String {
    let message = response.message.clone().unwrap_or_default();
    match &response.payload {
        None => message,
        Some(Payload::Created { count, .. }) => format!("{} with {} documents", message, count),
        Some(Payload::Added { .. }) => message,
        Some(Payload::Queried { results }) => {
            let mut lines = Vec::new();
            for query in results {
                lines.push(format!("Query: {}", query.query));
                for (j, hit) in query.results.iter().enumerate() {
                    let distance = hit
                        .distance
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "N/A".into());
                    lines.push(format!(
                        "  Result {} (distance: {}): {}",
                        j + 1,
                        distance,
                        hit.document.as_deref().unwrap_or("")
                    ));
                }
                lines.push(String::new());
            }
            lines.join("\n")
        }
        Some(Payload::Listed { collections }) => {
            if collections.is_empty() {
                return "No collections found".into();
            }
            let mut lines = Vec::new();
            for c in collections {
                lines.push(format!("- {} (id: {})", c.name, c.id));
                match (c.count, &c.count_error) {
                    (Some(n), _) => lines.push(format!("  Documents: {}", n)),
                    (None, Some(reason)) => {
                        lines.push(format!("  Documents: Unable to count ({})", reason))
                    }
                    (None, None) => lines.push("  Documents: Unable to count".into()),
                }
                lines.push(String::new());
            }
            lines.join("\n")
        }
        Some(Payload::Info { collection }) => {
            let metadata = serde_json::to_string_pretty(&collection.metadata)
                .unwrap_or_else(|_| "{}".into());
            let count = collection
                .count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unknown".into());
            [
                format!("Collection: {}", collection.name),
                format!("ID: {}", collection.id),
                format!("Document count: {}", count),
                format!("Metadata: {}", metadata),
            ]
            .join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::handlers::{CollectionSummary, QueryHit, QueryResult};
    use crate::store::Metadata;

    fn text_of(result: &McpToolResult) -> &str {
        match &result.content[0] {
            McpContent::Text { text } => text,
        }
    }

    #[test]
    fn test_mcp_tool_result_serialize() {
        let result = McpToolResult::text("test");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        assert!(json.contains("\"test\""));
        assert!(json.contains("\"isError\":false"));
    }

    #[test]
    fn test_render_created() {
        let resp = Response::ok("Successfully created collection 'docs'").payload(
            Payload::Created {
                collection_id: "id-1".into(),
                count: 0,
            },
        );
        let result = McpToolResult::from(&resp);
        assert!(!result.is_error);
        assert_eq!(
            text_of(&result),
            "Successfully created collection 'docs' with 0 documents"
        );
    }

    #[test]
    fn test_render_failure() {
        let resp = Response::failure(ErrorKind::NotFound, "Collection docs does not exist");
        let result = McpToolResult::from(&resp);
        assert!(result.is_error);
        assert_eq!(text_of(&result), "Error: Collection docs does not exist");
    }

    #[test]
    fn test_render_query() {
        let resp = Response::with_payload(Payload::Queried {
            results: vec![QueryResult {
                query: "machine learning".into(),
                results: vec![
                    QueryHit {
                        document: Some("ml doc".into()),
                        distance: Some(0.5),
                        metadata: None,
                    },
                    QueryHit {
                        document: Some("ai doc".into()),
                        distance: None,
                        metadata: None,
                    },
                ],
            }],
        });
        let text = McpToolResult::from(&resp);
        let text = text_of(&text);
        assert!(text.starts_with("Query: machine learning\n"));
        assert!(text.contains("  Result 1 (distance: 0.5): ml doc"));
        assert!(text.contains("  Result 2 (distance: N/A): ai doc"));
    }

    #[test]
    fn test_render_empty_list() {
        let resp = Response::with_payload(Payload::Listed {
            collections: vec![],
        });
        assert_eq!(text_of(&McpToolResult::from(&resp)), "No collections found");
    }

    #[test]
    fn test_render_list_with_uncountable_collection() {
        let resp = Response::with_payload(Payload::Listed {
            collections: vec![CollectionSummary {
                name: "docs".into(),
                id: "id-1".into(),
                count: None,
                count_error: Some("count failed: timeout".into()),
                metadata: Metadata::new(),
            }],
        });
        let result = McpToolResult::from(&resp);
        let text = text_of(&result);
        assert!(text.contains("- docs (id: id-1)"));
        assert!(text.contains("Unable to count (count failed: timeout)"));
    }

    #[test]
    fn test_render_info() {
        let mut metadata = Metadata::new();
        metadata.insert("k".into(), "v".into());
        let resp = Response::with_payload(Payload::Info {
            collection: CollectionSummary {
                name: "docs".into(),
                id: "id-1".into(),
                count: Some(2),
                count_error: None,
                metadata,
            },
        });
        let result = McpToolResult::from(&resp);
        let text = text_of(&result);
        assert!(text.contains("Collection: docs\nID: id-1\nDocument count: 2\nMetadata: {"));
        assert!(text.contains("\"k\": \"v\""));
    }
}
