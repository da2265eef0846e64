//! Error types for the ingest layer.
//!
//! - [`FetchError`] -- a remote request failed (transport, status, payload)
//! - [`SyncError`] -- a reconciliation run failed, possibly part-way through
//! - [`IngestError`] -- the population fetch failed

use quest_store::{StoreError, TableError};
use quest_types::SyncResult;

/// Errors raised by remote collaborators.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be completed (connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// The response body was not what the caller expected.
    #[error("unexpected payload from {url}: {message}")]
    Payload {
        /// Requested URL.
        url: String,
        /// What was wrong with it.
        message: String,
    },
}

/// Errors raised by the Reconciliation Engine.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Listing or checking the destination failed before any change was made.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The remote index could not be read.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// An upload or delete failed after the diff was computed.
    ///
    /// `applied` lists every operation that completed before the failure;
    /// the next run recomputes the diff from store state and finishes the job.
    #[error(
        "reconciliation interrupted at `{key}` after {} uploads and {} deletes: {cause}",
        .applied.uploaded.len(),
        .applied.deleted.len()
    )]
    Interrupted {
        /// Bare name whose operation failed.
        key: String,
        /// Operations that completed before the failure.
        applied: SyncResult,
        /// The failure itself.
        #[source]
        cause: Box<SyncError>,
    },
}

impl SyncError {
    /// Operations known to have completed, even when the run failed.
    pub fn applied(&self) -> Option<&SyncResult> {
        match self {
            Self::Interrupted { applied, .. } => Some(applied),
            Self::Store(_) | Self::Fetch(_) => None,
        }
    }
}

/// Errors raised by the population fetch.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The API request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Writing the raw payload failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writing a normalized table failed.
    #[error(transparent)]
    Table(#[from] TableError),

    /// The normalized batch could not be assembled.
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Required fields are absent from every record.
    #[error("missing expected fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A record was not a JSON object.
    #[error("record {index} is not a JSON object")]
    InvalidRecord {
        /// Position of the offending record.
        index: usize,
    },
}
