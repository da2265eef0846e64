//! Error types for the storage layer.
//!
//! [`StoreError`] covers object access; [`TableError`] covers decoding and
//! encoding tabular payloads and wraps [`StoreError`] for the combined
//! read/write helpers.

/// Errors raised by a [`crate::BlobStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The bucket is not known to this store or cannot be reached.
    #[error("unknown or unreachable bucket: {0}")]
    UnknownBucket(String),

    /// No object exists at the requested key.
    #[error("object not found: s3://{bucket}/{key}")]
    NotFound {
        /// Bucket that was queried.
        bucket: String,
        /// Key that was queried.
        key: String,
    },

    /// The key cannot be stored as an object path without changing it.
    #[error("key cannot be represented as an object path: {0:?}")]
    InvalidKey(String),

    /// The underlying object store failed.
    #[error("object store error: {0}")]
    Backend(#[from] object_store::Error),

    /// A JSON payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store was configured incorrectly.
    #[error("store configuration error: {0}")]
    Config(String),
}

/// Errors raised while decoding or encoding a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The format tag is not one of `csv` or `parquet`.
    #[error("unsupported table format: {0}")]
    UnsupportedFormat(String),

    /// Reading or writing the backing object failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Arrow rejected the data (CSV parse, schema mismatch, cast).
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// The Parquet codec failed.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The payload was not valid UTF-8 text.
    #[error("table payload is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}
