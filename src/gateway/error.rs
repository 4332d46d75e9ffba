//! Gateway error types.
//!
//! Every request outcome other than a successful response is one of these.
//! Each maps to exactly one status code; the gateway still attaches the
//! base cache/CORS headers to all of them.

use hyper::{Method, StatusCode};

use super::range::RangeError;
use crate::store::StoreError;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Gateway errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// Method outside GET, HEAD, OPTIONS.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(Method),

    /// Request targeted the bare root.
    #[error("empty storage key")]
    EmptyKey,

    /// Path did not decode to a usable key.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The store has no object under this key.
    #[error("object not found: {key}")]
    NotFound { key: String },

    /// The `Range` header is malformed or does not fit the object.
    #[error("range not satisfiable for '{key}': {source}")]
    RangeNotSatisfiable {
        key: String,
        size: u64,
        #[source]
        source: RangeError,
    },

    /// The store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The body could not be positioned for streaming.
    #[error("failed to open body of '{key}': {source}")]
    Body {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl GatewayError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::EmptyKey | Self::InvalidKey(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Store(_) | Self::Body { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short plain-text body for the error response.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed(_) => "Method Not Allowed",
            Self::EmptyKey => "Missing object key",
            Self::InvalidKey(_) => "Invalid object key",
            Self::NotFound { .. } => "Not Found",
            Self::RangeNotSatisfiable { .. } => "Range Not Satisfiable",
            Self::Store(_) | Self::Body { .. } => "Internal Server Error",
        }
    }

    /// True for failures of the gateway or its store rather than the client.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}
