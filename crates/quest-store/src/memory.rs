//! In-memory [`BlobStore`] keyed by `(bucket, key)`.
//!
//! Used for tests and for exercising the jobs without external services.
//! Buckets must be registered before use so that the "unknown bucket"
//! configuration path behaves the same way as with a real backend.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::blob::BlobStore;
use crate::error::StoreError;

/// A stored object: its bytes and the content type it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object body.
    pub body: Bytes,
    /// Content type supplied on write.
    pub content_type: String,
}

/// In-memory object store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: RwLock<BTreeMap<String, BTreeMap<String, StoredObject>>>,
}

impl MemoryStore {
    /// Create an empty store with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given buckets registered.
    pub fn with_buckets<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let map = buckets
            .into_iter()
            .map(|b| (b.into(), BTreeMap::new()))
            .collect();
        Self {
            buckets: RwLock::new(map),
        }
    }

    /// Register a bucket. Registering an existing bucket is a no-op.
    pub async fn create_bucket(&self, bucket: &str) {
        self.buckets
            .write()
            .await
            .entry(bucket.to_owned())
            .or_default();
    }

    /// Fetch an object together with its content type.
    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
    }

    /// Number of objects across all buckets.
    pub async fn len(&self) -> usize {
        self.buckets.read().await.values().map(BTreeMap::len).sum()
    }

    /// True when no bucket holds any object.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::UnknownBucket(bucket.to_owned()))?;
        objects
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::UnknownBucket(bucket.to_owned()))?;
        objects.insert(
            key.to_owned(),
            StoredObject {
                body,
                content_type: content_type.to_owned(),
            },
        );
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<BTreeSet<String>, StoreError> {
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::UnknownBucket(bucket.to_owned()))?;
        Ok(objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::UnknownBucket(bucket.to_owned()))?;
        objects.remove(key);
        Ok(())
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        if self.buckets.read().await.contains_key(bucket) {
            Ok(())
        } else {
            Err(StoreError::UnknownBucket(bucket.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(s: &str) -> Bytes {
        Bytes::from(s.to_owned())
    }

    #[tokio::test]
    async fn put_get_round_trip_keeps_content_type() {
        let store = MemoryStore::with_buckets(["data"]);
        let put = store.put("data", "bls/a", body("x"), "text/plain").await;
        assert!(put.is_ok());

        let got = store.get("data", "bls/a").await.unwrap_or_default();
        assert_eq!(got, body("x"));
        let object = store.object("data", "bls/a").await;
        assert_eq!(object.map(|o| o.content_type), Some("text/plain".to_owned()));
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = MemoryStore::with_buckets(["data"]);
        let result = store.get("data", "nope").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn unknown_bucket_is_rejected_everywhere() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.ensure_bucket("ghost").await,
            Err(StoreError::UnknownBucket(_))
        ));
        assert!(store.put("ghost", "k", body("x"), "text/plain").await.is_err());
        assert!(store.list("ghost", "").await.is_err());
        assert!(store.delete("ghost", "k").await.is_err());

        store.create_bucket("ghost").await;
        assert!(store.ensure_bucket("ghost").await.is_ok());
    }

    #[tokio::test]
    async fn list_is_prefix_scoped_and_case_sensitive() {
        let store = MemoryStore::with_buckets(["data", "other"]);
        for key in ["bls/a", "bls/B", "BLS/c", "population/d"] {
            let _ = store.put("data", key, body(key), "text/plain").await;
        }
        let _ = store.put("other", "bls/z", body("z"), "text/plain").await;

        let keys = store.list("data", "bls/").await.unwrap_or_default();
        let keys: Vec<_> = keys.into_iter().collect();
        assert_eq!(keys, vec!["bls/B".to_owned(), "bls/a".to_owned()]);
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let store = MemoryStore::with_buckets(["data"]);
        assert!(store.delete("data", "never-written").await.is_ok());
        let _ = store.put("data", "k", body("x"), "text/plain").await;
        assert!(store.delete("data", "k").await.is_ok());
        assert!(store.is_empty().await);
    }
}
