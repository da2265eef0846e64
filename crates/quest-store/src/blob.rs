//! The Object Store Facade.
//!
//! Keys are flat strings. `list` performs plain string-prefix matching and
//! returns full keys (prefix included), so callers can strip the prefix
//! themselves with [`StoreLocation::bare_name`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use quest_types::StoreLocation;

use crate::error::StoreError;

/// Content type used for JSON payloads.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A key-value byte store addressed by `(bucket, key)`.
///
/// Each call is a single atomic operation with no cross-call transaction.
/// Implementations enforce their own I/O timeouts.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the object at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such object exists.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError>;

    /// Write `body` at `key`, replacing any existing object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// List every full key in `bucket` that starts with `prefix`.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<BTreeSet<String>, StoreError>;

    /// Remove the object at `key`. Removing a missing key succeeds.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError>;

    /// Check that `bucket` exists and is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownBucket`] if it is not.
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StoreError>;
}

/// Serialize `value` as pretty-printed JSON and store it at `location + name`.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if serialization fails, or the
/// store's error if the write fails.
pub async fn put_json<S, T>(
    store: &S,
    location: &StoreLocation,
    name: &str,
    value: &T,
) -> Result<(), StoreError>
where
    S: BlobStore + ?Sized,
    T: Serialize + Sync,
{
    let body = serde_json::to_vec_pretty(value)?;
    let key = location.key(name);
    store
        .put(&location.bucket, &key, Bytes::from(body), CONTENT_TYPE_JSON)
        .await?;
    tracing::debug!(uri = location.uri(name), "stored JSON object");
    Ok(())
}
