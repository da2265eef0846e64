//! Object store construction from [`StorageConfig`].

use std::sync::Arc;

use quest_store::{BlobStore, MemoryStore, ObjectStoreBackend, StoreError};

use crate::config::{BackendKind, StorageConfig};

/// Build the store selected by `config`, with `config.bucket` registered.
///
/// # Errors
///
/// Returns [`StoreError`] if the local bucket directory cannot be created or
/// the S3 client cannot be built.
pub fn build_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, StoreError> {
    let bucket = config.bucket.as_str();
    let store: Arc<dyn BlobStore> = match config.backend {
        BackendKind::Memory => Arc::new(MemoryStore::with_buckets([bucket])),
        BackendKind::Local => Arc::new(ObjectStoreBackend::local(&config.root, [bucket])?),
        BackendKind::S3 => Arc::new(ObjectStoreBackend::s3([bucket])?),
    };
    tracing::info!(backend = ?config.backend, bucket, "object store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use bytes::Bytes;

    use super::*;

    #[tokio::test]
    async fn memory_backend_registers_bucket() {
        let config = StorageConfig {
            backend: BackendKind::Memory,
            bucket: String::from("quest"),
            ..StorageConfig::default()
        };
        let store = build_store(&config).expect("builds");
        store.ensure_bucket("quest").await.expect("bucket registered");
        assert!(store.ensure_bucket("other").await.is_err());
    }

    #[tokio::test]
    async fn local_backend_writes_under_root() {
        let root = tempfile::tempdir().expect("tempdir");
        let config = StorageConfig {
            backend: BackendKind::Local,
            root: root.path().to_path_buf(),
            bucket: String::from("quest"),
        };
        let store = build_store(&config).expect("builds");
        store
            .put("quest", "bls/pr.txt", Bytes::from_static(b"x"), "text/plain")
            .await
            .expect("put");
        assert!(root.path().join("quest").join("bls").join("pr.txt").exists());
    }
}
