//! Store error types.

/// Result type for store lookups.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Backend failures, distinct from a miss (which is `Ok(None)`).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// IO error with context.
    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Metadata database failure.
    #[error("metadata database error: {0}")]
    Metadata(#[from] redb::Error),

    /// A metadata record exists but cannot be decoded.
    #[error("corrupt metadata for '{key}': {source}")]
    CorruptMetadata {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap any redb error type.
    pub(crate) fn metadata(err: impl Into<redb::Error>) -> Self {
        Self::Metadata(err.into())
    }
}
