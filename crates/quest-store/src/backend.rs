//! [`BlobStore`] over the [`object_store`] crate.
//!
//! An [`ObjectStoreBackend`] maps each bucket name to one
//! [`object_store::ObjectStore`] instance. Two constructors cover the
//! deployments we run:
//!
//! | Constructor | Backing store | Bucket maps to |
//! |-------------|---------------|----------------|
//! | [`ObjectStoreBackend::local`] | `LocalFileSystem` | `{root}/{bucket}/` directory |
//! | [`ObjectStoreBackend::s3`] | `AmazonS3` | S3 bucket, credentials from env |
//!
//! `object_store` lists by path segment, while the facade lists by raw string
//! prefix. [`BlobStore::list`] therefore lists the deepest directory the
//! prefix names and filters the result by string prefix.
//!
//! Keys map to [`Path`]s segment by segment; `object_store` percent-encodes
//! reserved characters (`~`, `%`, `#`, ...) inside a segment, and listing
//! decodes them again, so `list` returns exactly the keys that were `put`.
//! Keys with empty segments (`a//b`, `a/`, `/a`) have no such round trip and
//! are rejected with [`StoreError::InvalidKey`].

use std::collections::{BTreeSet, HashMap};
use std::path::Path as FsPath;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore, PutOptions, PutPayload};
use percent_encoding::percent_decode_str;

use crate::blob::BlobStore;
use crate::error::StoreError;

/// One registered bucket.
#[derive(Debug, Clone)]
struct BucketHandle {
    store: Arc<dyn ObjectStore>,
    /// Whether the store accepts object attributes (content type) on put.
    /// `LocalFileSystem` rejects them.
    attributes: bool,
}

/// Object store facade backed by one [`ObjectStore`] per bucket.
#[derive(Debug, Clone, Default)]
pub struct ObjectStoreBackend {
    buckets: HashMap<String, BucketHandle>,
}

impl ObjectStoreBackend {
    /// Create a backend with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bucket` backed by an arbitrary [`ObjectStore`].
    #[must_use]
    pub fn with_store(
        mut self,
        bucket: impl Into<String>,
        store: Arc<dyn ObjectStore>,
        supports_attributes: bool,
    ) -> Self {
        self.buckets.insert(
            bucket.into(),
            BucketHandle {
                store,
                attributes: supports_attributes,
            },
        );
        self
    }

    /// Local filesystem backend: each bucket is a directory under `root`.
    ///
    /// Bucket directories are created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if a bucket directory cannot be created,
    /// or [`StoreError::Backend`] if `object_store` rejects it.
    pub fn local<I, S>(root: &FsPath, buckets: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut backend = Self::new();
        for bucket in buckets {
            let bucket = bucket.into();
            let dir = root.join(&bucket);
            std::fs::create_dir_all(&dir).map_err(|e| {
                StoreError::Config(format!(
                    "cannot create bucket directory {}: {e}",
                    dir.display()
                ))
            })?;
            let store = LocalFileSystem::new_with_prefix(&dir)?;
            tracing::info!(bucket, root = %dir.display(), "registered local bucket");
            backend = backend.with_store(bucket, Arc::new(store), false);
        }
        Ok(backend)
    }

    /// S3 backend. Region and credentials come from the standard `AWS_*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the S3 client cannot be built.
    pub fn s3<I, S>(buckets: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut backend = Self::new();
        for bucket in buckets {
            let bucket = bucket.into();
            let store = AmazonS3Builder::from_env()
                .with_bucket_name(&bucket)
                .build()?;
            tracing::info!(bucket, "registered S3 bucket");
            backend = backend.with_store(bucket, Arc::new(store), true);
        }
        Ok(backend)
    }

    fn bucket(&self, bucket: &str) -> Result<&BucketHandle, StoreError> {
        self.buckets
            .get(bucket)
            .ok_or_else(|| StoreError::UnknownBucket(bucket.to_owned()))
    }
}

/// The directory component of a raw prefix, if any (`"bls/pr."` -> `"bls"`).
fn list_root(prefix: &str) -> Option<Path> {
    prefix
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .filter(|dir| !dir.is_empty())
        .map(Path::from)
}

/// Object path for a facade key.
fn key_path(key: &str) -> Result<Path, StoreError> {
    let path = Path::from(key);
    if !key.is_empty() && path_key(&path) == key {
        Ok(path)
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}

/// Facade key for an object path: segments decoded and joined with `/`.
fn path_key(path: &Path) -> String {
    path.parts()
        .map(|part| percent_decode_str(part.as_ref()).decode_utf8_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl BlobStore for ObjectStoreBackend {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let handle = self.bucket(bucket)?;
        let path = key_path(key)?;
        match handle.store.get(&path).await {
            Ok(result) => Ok(result.bytes().await?),
            Err(object_store::Error::NotFound { .. }) => Err(StoreError::NotFound {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let handle = self.bucket(bucket)?;
        let path = key_path(key)?;
        let mut attributes = Attributes::new();
        if handle.attributes {
            attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_owned()),
            );
        }
        let opts = PutOptions {
            attributes,
            ..PutOptions::default()
        };
        handle
            .store
            .put_opts(&path, PutPayload::from(body), opts)
            .await?;
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<BTreeSet<String>, StoreError> {
        let handle = self.bucket(bucket)?;
        let root = list_root(prefix);
        let metas: Vec<_> = handle.store.list(root.as_ref()).try_collect().await?;
        Ok(metas
            .into_iter()
            .map(|meta| path_key(&meta.location))
            .filter(|key| key.starts_with(prefix))
            .collect())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let handle = self.bucket(bucket)?;
        let path = key_path(key)?;
        match handle.store.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let handle = self.bucket(bucket)?;
        match handle.store.list_with_delimiter(None).await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!(bucket, error = %e, "bucket is not reachable");
                Err(StoreError::UnknownBucket(bucket.to_owned()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_root_takes_directory_part() {
        assert_eq!(list_root("bls/"), Some(Path::from("bls")));
        assert_eq!(list_root("bls/pr."), Some(Path::from("bls")));
        assert_eq!(list_root("a/b/c"), Some(Path::from("a/b")));
        assert_eq!(list_root("pr."), None);
        assert_eq!(list_root(""), None);
        assert_eq!(list_root("/x"), None);
    }

    #[test]
    fn reserved_characters_round_trip() {
        for key in ["bls/pr~notes", "bls/100%", "bls/a#b", "bls/[x] y", "plain"] {
            let path = key_path(key);
            assert!(path.as_ref().is_ok_and(|p| path_key(p) == key), "key {key:?}");
        }
    }

    #[test]
    fn keys_with_empty_segments_are_rejected() {
        for key in ["bls/", "/bls", "a//b", ""] {
            assert!(
                matches!(key_path(key), Err(StoreError::InvalidKey(_))),
                "key {key:?}"
            );
        }
    }

    #[tokio::test]
    async fn listing_returns_keys_as_written() {
        let backend = ObjectStoreBackend::new().with_store(
            "data",
            Arc::new(object_store::memory::InMemory::new()),
            true,
        );
        for key in ["bls/pr~notes", "bls/50%"] {
            assert!(backend.put("data", key, Bytes::from_static(b"x"), "text/plain").await.is_ok());
        }
        let keys = backend.list("data", "bls/").await.unwrap_or_default();
        assert_eq!(
            keys.into_iter().collect::<Vec<_>>(),
            vec!["bls/50%".to_owned(), "bls/pr~notes".to_owned()]
        );
        assert!(backend.get("data", "bls/pr~notes").await.is_ok());
        assert!(backend.delete("data", "bls/pr~notes").await.is_ok());
        assert!(matches!(
            backend.get("data", "bls/pr~notes").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn in_memory_object_store_round_trip() {
        let backend = ObjectStoreBackend::new().with_store(
            "data",
            Arc::new(object_store::memory::InMemory::new()),
            true,
        );
        let put = backend
            .put("data", "bls/pr.series", Bytes::from_static(b"x"), "text/plain")
            .await;
        assert!(put.is_ok());
        let _ = backend
            .put("data", "bls2/other", Bytes::from_static(b"y"), "text/plain")
            .await;

        let keys = backend.list("data", "bls/").await.unwrap_or_default();
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec!["bls/pr.series".to_owned()]);

        let got = backend.get("data", "bls/pr.series").await.unwrap_or_default();
        assert_eq!(got, Bytes::from_static(b"x"));

        assert!(backend.delete("data", "bls/pr.series").await.is_ok());
        assert!(backend.delete("data", "bls/pr.series").await.is_ok());
        assert!(matches!(
            backend.get("data", "bls/pr.series").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn unregistered_bucket_is_unknown() {
        let backend = ObjectStoreBackend::new();
        assert!(matches!(
            backend.ensure_bucket("ghost").await,
            Err(StoreError::UnknownBucket(_))
        ));
    }
}
