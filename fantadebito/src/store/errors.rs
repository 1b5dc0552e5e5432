use thiserror::Error;

/// Unified error type for record-store operations that application code can handle
#[derive(Error, Debug)]
pub enum StoreError {
    /// Object not found under the given key
    #[error("Object not found")]
    NotFound,

    /// The object bytes could not be encoded/decoded against the table schema
    #[error("Codec error: {message}")]
    Codec { message: String },

    /// Catch-all for non-recoverable storage errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<parquet::errors::ParquetError> for StoreError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        StoreError::Codec { message: err.to_string() }
    }
}

impl From<arrow::error::ArrowError> for StoreError {
    fn from(err: arrow::error::ArrowError) -> Self {
        StoreError::Codec { message: err.to_string() }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Codec { message: err.to_string() }
    }
}

/// Type alias for record-store operation results
pub type Result<T> = std::result::Result<T, StoreError>;
