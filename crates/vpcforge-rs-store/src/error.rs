//! Error types for metadata store operations.

/// Errors returned by metadata stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Table name rejected.
    #[error("invalid table name: {0}")]
    InvalidTable(String),
    /// Backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
