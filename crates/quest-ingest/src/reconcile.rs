//! Applying a reconciliation diff to a store.
//!
//! One run is: list the destination prefix once, diff against the desired
//! names, upload every missing name (ascending), then delete every stale
//! name (ascending). Operations run one at a time with no locking. A failure
//! stops the run and reports what was already applied; because nothing is
//! persisted besides the objects themselves, the next run picks up from
//! whatever state the store is in.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use quest_store::BlobStore;
use quest_types::{StoreLocation, SyncResult};

use crate::diff::diff_keys;
use crate::error::SyncError;
use crate::source::ContentFetcher;

/// Content type used when the remote did not report one.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Make the objects under `destination` match `desired` exactly.
///
/// `desired` holds bare names; they are compared against existing keys with
/// the destination prefix stripped. Keys outside the prefix are never read
/// or written. A key equal to the prefix itself (a "directory marker") is
/// not a file and is left alone; an empty desired name would address that
/// marker, so it is dropped with a warning.
///
/// # Errors
///
/// Returns [`SyncError::Store`] if the initial listing fails (nothing has
/// changed), or [`SyncError::Interrupted`] carrying the partial
/// [`SyncResult`] if an upload or delete fails.
pub async fn reconcile<S, F>(
    desired: &BTreeSet<String>,
    destination: &StoreLocation,
    store: &S,
    fetcher: &F,
) -> Result<SyncResult, SyncError>
where
    S: BlobStore + ?Sized,
    F: ContentFetcher + ?Sized,
{
    let listed = store.list(&destination.bucket, &destination.prefix).await?;
    let existing: BTreeSet<String> = listed
        .iter()
        .filter_map(|key| destination.bare_name(key))
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    let named: BTreeSet<String> = desired.iter().filter(|n| !n.is_empty()).cloned().collect();
    if named.len() < desired.len() {
        warn!(destination = %destination, "ignoring empty desired name");
    }

    let diff = diff_keys(&named, &existing);
    info!(
        destination = %destination,
        desired = named.len(),
        existing = existing.len(),
        to_upload = diff.to_upload.len(),
        to_delete = diff.to_delete.len(),
        "computed reconciliation diff"
    );

    let mut applied = SyncResult::default();

    for name in diff.to_upload {
        if let Err(cause) = upload(&name, destination, store, fetcher).await {
            return Err(interrupted(name, applied, cause));
        }
        applied.uploaded.push(name);
    }

    for name in diff.to_delete {
        let key = destination.key(&name);
        if let Err(cause) = store.delete(&destination.bucket, &key).await {
            return Err(interrupted(name, applied, cause.into()));
        }
        debug!(uri = destination.uri(&name), "deleted stale object");
        applied.deleted.push(name);
    }

    info!(
        destination = %destination,
        uploaded = applied.uploaded.len(),
        deleted = applied.deleted.len(),
        "reconciliation complete"
    );
    Ok(applied)
}

async fn upload<S, F>(
    name: &str,
    destination: &StoreLocation,
    store: &S,
    fetcher: &F,
) -> Result<(), SyncError>
where
    S: BlobStore + ?Sized,
    F: ContentFetcher + ?Sized,
{
    let object = fetcher.fetch(name).await?;
    let content_type = object.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);
    let size = object.body.len();
    store
        .put(&destination.bucket, &destination.key(name), object.body, content_type)
        .await?;
    debug!(uri = destination.uri(name), size, content_type, "uploaded object");
    Ok(())
}

fn interrupted(key: String, applied: SyncResult, cause: SyncError) -> SyncError {
    tracing::warn!(
        key,
        uploaded = applied.uploaded.len(),
        deleted = applied.deleted.len(),
        error = %cause,
        "reconciliation interrupted"
    );
    SyncError::Interrupted {
        key,
        applied,
        cause: Box::new(cause),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use quest_store::MemoryStore;

    use super::*;
    use crate::error::FetchError;
    use crate::source::RemoteObject;

    /// Serves `name` as its own body; fails for names listed in `broken`.
    struct EchoFetcher {
        broken: Vec<&'static str>,
    }

    #[async_trait::async_trait]
    impl ContentFetcher for EchoFetcher {
        async fn fetch(&self, name: &str) -> Result<RemoteObject, FetchError> {
            if self.broken.contains(&name) {
                return Err(FetchError::Status {
                    url: name.to_owned(),
                    status: 503,
                });
            }
            Ok(RemoteObject {
                body: Bytes::from(name.to_owned()),
                content_type: Some("text/plain".to_owned()),
            })
        }
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[tokio::test]
    async fn uploads_then_is_idempotent() {
        let store = MemoryStore::with_buckets(["data"]);
        let dest = StoreLocation::new("data", "bls/");
        let fetcher = EchoFetcher { broken: Vec::new() };
        let desired = names(&["pr.series", "pr.class"]);

        let first = reconcile(&desired, &dest, &store, &fetcher).await;
        let first = first.unwrap_or_default();
        assert_eq!(first.uploaded, ["pr.class", "pr.series"]);
        assert!(first.deleted.is_empty());

        let second = reconcile(&desired, &dest, &store, &fetcher).await;
        assert!(second.is_ok_and(|r| r.is_empty()));
    }

    #[tokio::test]
    async fn directory_marker_is_left_alone() {
        let store = MemoryStore::with_buckets(["data"]);
        let _ = store.put("data", "bls/", Bytes::new(), "application/x-directory").await;
        let dest = StoreLocation::new("data", "bls/");
        let fetcher = EchoFetcher { broken: Vec::new() };

        let result = reconcile(&BTreeSet::new(), &dest, &store, &fetcher).await;
        assert!(result.is_ok_and(|r| r.is_empty()));
        assert!(store.object("data", "bls/").await.is_some());
    }

    #[tokio::test]
    async fn empty_desired_name_never_touches_marker() {
        let store = MemoryStore::with_buckets(["data"]);
        let dest = StoreLocation::new("data", "bls/");
        let fetcher = EchoFetcher { broken: Vec::new() };
        let desired = names(&["", "pr.class"]);

        let first = reconcile(&desired, &dest, &store, &fetcher).await;
        assert!(first.is_ok_and(|r| r.uploaded == ["pr.class"] && r.deleted.is_empty()));
        assert!(store.object("data", "bls/").await.is_none());

        let second = reconcile(&desired, &dest, &store, &fetcher).await;
        assert!(second.is_ok_and(|r| r.is_empty()));
    }

    #[tokio::test]
    async fn failed_fetch_reports_partial_progress() {
        let store = MemoryStore::with_buckets(["data"]);
        let dest = StoreLocation::new("data", "bls/");
        let fetcher = EchoFetcher {
            broken: vec!["b"],
        };

        let err = reconcile(&names(&["a", "b", "c"]), &dest, &store, &fetcher)
            .await
            .err();
        assert!(matches!(&err, Some(SyncError::Interrupted { key, .. }) if key == "b"));
        let applied = err.as_ref().and_then(SyncError::applied);
        assert_eq!(applied.map(|a| a.uploaded.clone()), Some(vec!["a".to_owned()]));
        assert!(store.object("data", "bls/a").await.is_some());
        assert!(store.object("data", "bls/c").await.is_none());
    }

    #[tokio::test]
    async fn missing_bucket_fails_before_any_work() {
        let store = MemoryStore::new();
        let dest = StoreLocation::new("ghost", "bls/");
        let fetcher = EchoFetcher { broken: Vec::new() };
        let result = reconcile(&names(&["a"]), &dest, &store, &fetcher).await;
        assert!(matches!(result, Err(SyncError::Store(_))));
    }
}
