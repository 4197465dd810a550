use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by the vector store facade.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to initialize Chroma client: {0}")]
    Init(String),

    #[error("Collection {0} does not exist")]
    NotFound(String),

    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("Embedding error: {0}")]
    Embedding(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// Failures raised while handling one request.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

pub type OperationResult<T> = Result<T, OperationError>;

impl OperationError {
    pub fn validation(message: impl Into<String>) -> Self {
        OperationError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            OperationError::Validation(_) => ErrorKind::ValidationError,
            OperationError::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            OperationError::Store(_) => ErrorKind::StoreError,
            OperationError::UnknownOperation(_) => ErrorKind::ProtocolError,
        }
    }
}

/// Error class reported in failed response envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    StoreError,
    ProtocolError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            OperationError::validation("x").kind(),
            ErrorKind::ValidationError
        );
        assert_eq!(
            OperationError::from(StoreError::NotFound("docs".into())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            OperationError::from(StoreError::backend("add", "boom")).kind(),
            ErrorKind::StoreError
        );
        assert_eq!(
            OperationError::UnknownOperation("nope".into()).kind(),
            ErrorKind::ProtocolError
        );
    }

    #[test]
    fn test_backend_message_names_operation() {
        let err = StoreError::backend("create_collection", "already exists");
        assert_eq!(err.to_string(), "create_collection failed: already exists");
    }

    #[test]
    fn test_error_kind_serializes_as_name() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, "\"NotFound\"");
    }
}
