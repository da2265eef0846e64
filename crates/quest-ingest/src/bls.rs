//! BLS time-series sync job.
//!
//! Mirrors one directory of `download.bls.gov/pub/time.series/` into a
//! store prefix: whatever the index lists is uploaded, whatever it no longer
//! lists is deleted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use quest_store::BlobStore;
use quest_types::{StoreLocation, SyncResult};

use crate::error::SyncError;
use crate::reconcile::reconcile;
use crate::source::{ContentFetcher, IndexSource};

/// The productivity-and-costs (`pr`) time-series directory.
pub const DEFAULT_INDEX_URL: &str = "https://download.bls.gov/pub/time.series/pr/";

/// Where the BLS sync writes and what it mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlsSyncConfig {
    /// Destination bucket.
    pub bucket: String,
    /// Destination key prefix.
    pub prefix: String,
    /// Index page to mirror.
    pub index_url: String,
}

impl BlsSyncConfig {
    /// Config mirroring [`DEFAULT_INDEX_URL`] into `bucket` / `prefix`.
    pub fn new(bucket: &str, prefix: &str) -> Self {
        Self {
            bucket: bucket.to_owned(),
            prefix: prefix.to_owned(),
            index_url: DEFAULT_INDEX_URL.to_owned(),
        }
    }

    /// Destination namespace.
    pub fn destination(&self) -> StoreLocation {
        StoreLocation::new(&self.bucket, &self.prefix)
    }
}

/// Run the BLS sync: check the bucket, crawl the index, reconcile.
///
/// `source` provides both the listing and the file bodies.
///
/// # Errors
///
/// Returns [`SyncError::Store`] if the bucket is unreachable,
/// [`SyncError::Fetch`] if the index cannot be read, or whatever
/// [`reconcile`] returns.
pub async fn perform_sync<S, R>(
    config: &BlsSyncConfig,
    store: &S,
    source: &R,
) -> Result<SyncResult, SyncError>
where
    S: BlobStore + ?Sized,
    R: IndexSource + ContentFetcher + ?Sized,
{
    store.ensure_bucket(&config.bucket).await?;

    let desired: BTreeSet<String> = source.list().await?.into_iter().collect();
    tracing::info!(
        bucket = config.bucket,
        prefix = config.prefix,
        objects = desired.len(),
        "starting BLS sync"
    );

    reconcile(&desired, &config.destination(), store, source).await
}
