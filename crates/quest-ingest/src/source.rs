//! Collaborator interfaces consumed by the ingest jobs.
//!
//! All three are implemented over HTTP by [`crate::http`]; tests substitute
//! scripted implementations.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

/// Body of a remote file plus the content type the server reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// Raw bytes.
    pub body: Bytes,
    /// `Content-Type` header, if any.
    pub content_type: Option<String>,
}

/// A remote listing of available file names.
#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Bare file names currently advertised. May be empty; never contains
    /// directory markers.
    async fn list(&self) -> Result<Vec<String>, FetchError>;
}

/// Fetches the content of a file advertised by an [`IndexSource`].
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Download `name`, relative to the index base URL.
    async fn fetch(&self, name: &str) -> Result<RemoteObject, FetchError>;
}

/// Fetches a JSON document.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// GET `url` and parse the body as JSON.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError>;
}
