//! Error type for the job orchestrators.

use quest_analytics::AnalyticsError;
use quest_ingest::{FetchError, IngestError, SyncError};
use quest_store::StoreError;

use crate::config::ConfigError;

/// Errors that can end a job run.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The object store could not be built.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The HTTP session could not be built.
    #[error("http error: {0}")]
    Fetch(#[from] FetchError),

    /// The BLS sync failed. May carry a partial result.
    #[error("BLS sync failed: {0}")]
    Sync(#[from] SyncError),

    /// The population fetch failed.
    #[error("population ingest failed: {0}")]
    Ingest(#[from] IngestError),

    /// The analytics run failed.
    #[error("analytics failed: {0}")]
    Analytics(#[from] AnalyticsError),
}
