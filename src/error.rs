//! Error types for the key-value store
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for the store and its request layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key not found (absent or expired)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Operation issued before `Store::initialize`
    #[error("Store has not been initialized")]
    NotInitialized,

    /// A WAL line that could not be decoded
    #[error("Corrupt log entry at line {line}: {reason}")]
    CorruptLogEntry { line: usize, reason: String },

    /// Failure to open, read, write or rename a log file
    #[error("I/O failure during {operation} ({target}): {source}")]
    Io {
        operation: &'static str,
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Wraps an I/O error with the operation and key or path it affected.
    pub fn io(operation: &'static str, target: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            operation,
            target: target.into(),
            source,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            StoreError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::CorruptLogEntry { .. }
            | StoreError::Io { .. }
            | StoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the store.
pub type Result<T> = std::result::Result<T, StoreError>;
