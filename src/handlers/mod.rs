//! Operation handlers.
//!
//! One async function per operation. Each validates its arguments, calls
//! the store facade, and builds a [`Response`] envelope:
//! - `collections` -- create_collection, list_collections, delete_collection, get_collection_info
//! - `documents`   -- add_documents, query_collection

pub mod collections;
pub mod documents;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ErrorKind, OperationError, OperationResult};
use crate::store::Metadata;

/// Uniform result envelope shared by both transports.
///
/// Serializes to one flat JSON object:
/// ```json
/// { "success": true, "message": "...", "collection_id": "...", "count": 0 }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(flatten)]
    pub payload: Option<Payload>,
}

/// Operation-specific part of a successful response.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Created { collection_id: String, count: usize },
    Added { count: usize },
    Queried { results: Vec<QueryResult> },
    Listed { collections: Vec<CollectionSummary> },
    Info { collection: CollectionSummary },
}

/// Matches for one query text, nearest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub query: String,
    pub results: Vec<QueryHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryHit {
    pub document: Option<String>,
    pub distance: Option<f64>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub id: String,
    /// `None` when the store could not count; `count_error` says why.
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_error: Option<String>,
    pub metadata: Metadata,
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error_kind: None,
            payload: None,
        }
    }

    pub fn with_payload(payload: Payload) -> Self {
        Self {
            success: true,
            message: None,
            error_kind: None,
            payload: Some(payload),
        }
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            error_kind: Some(kind),
            payload: None,
        }
    }
}

impl From<OperationError> for Response {
    fn from(err: OperationError) -> Self {
        Response::failure(err.kind(), err.to_string())
    }
}

/// Decode tool arguments; `null` counts as an empty object.
fn parse_args<T: DeserializeOwned>(args: &Value) -> OperationResult<T> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args.clone()
    };
    serde_json::from_value(args)
        .map_err(|e| OperationError::validation(format!("Invalid arguments: {}", e)))
}

/// A required, non-blank string argument.
fn require_name(value: Option<String>, message: &str) -> OperationResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(OperationError::validation(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_envelope_shape() {
        let resp = Response::failure(ErrorKind::NotFound, "Collection docs does not exist");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            json!({
                "success": false,
                "message": "Collection docs does not exist",
                "error_kind": "NotFound"
            })
        );
    }

    #[test]
    fn test_payload_is_flattened() {
        let resp = Response::ok("Successfully created collection 'docs'").payload(Payload::Created {
            collection_id: "abc".into(),
            count: 0,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["collection_id"], "abc");
        assert_eq!(json["count"], 0);
        assert!(json.get("error_kind").is_none());
    }

    #[test]
    fn test_count_error_omitted_when_counted() {
        let summary = CollectionSummary {
            name: "docs".into(),
            id: "1".into(),
            count: Some(3),
            count_error: None,
            metadata: Metadata::new(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["count"], 3);
        assert!(json.get("count_error").is_none());
    }

    #[test]
    fn test_null_args_are_empty_object() {
        #[derive(serde::Deserialize)]
        struct Args {
            name: Option<String>,
        }
        let args: Args = parse_args(&Value::Null).unwrap();
        assert!(args.name.is_none());
    }

    #[test]
    fn test_wrong_argument_type_is_validation_error() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Args {
            name: Option<String>,
        }
        let err = parse_args::<Args>(&json!({"name": 5})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_require_name_rejects_blank() {
        assert!(require_name(Some("  ".into()), "required").is_err());
        assert!(require_name(None, "required").is_err());
        assert_eq!(require_name(Some("docs".into()), "required").unwrap(), "docs");
    }
}
