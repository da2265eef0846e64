//! HTTP collaborators over `reqwest`.
//!
//! Both upstream services reject anonymous clients, so every request carries
//! a `User-Agent` naming this tool and a contact address. Each request is
//! bounded by the session timeout; retries are left to the caller.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::error::FetchError;
use crate::source::{ContentFetcher, IndexSource, JsonSource, RemoteObject};

/// Client name sent in the `User-Agent` header.
const CLIENT_NAME: &str = "quest-jobs";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A `reqwest` client with the identifying `User-Agent` and timeout applied.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: reqwest::Client,
}

impl HttpSession {
    /// Build a session that identifies itself with `contact_email`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the TLS backend cannot initialize.
    pub fn new(contact_email: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent(contact_email))
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_owned(),
                source,
            })
    }

    /// GET `url` and return the body bytes with the reported content type.
    pub async fn get_bytes(&self, url: &str) -> Result<RemoteObject, FetchError> {
        let response = self.get(url).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_owned(),
                source,
            })?;
        Ok(RemoteObject { body, content_type })
    }
}

#[async_trait]
impl JsonSource for HttpSession {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let text = self.get_text(url).await?;
        serde_json::from_str(&text).map_err(|e| FetchError::Payload {
            url: url.to_owned(),
            message: format!("invalid JSON: {e}"),
        })
    }
}

/// `User-Agent` value, e.g. `quest-jobs/0.1.0 (data@example.com)`.
fn user_agent(contact_email: &str) -> String {
    format!(
        "{CLIENT_NAME}/{} ({contact_email})",
        env!("CARGO_PKG_VERSION")
    )
}

// ---------------------------------------------------------------------------
// Directory index
// ---------------------------------------------------------------------------

/// A remote directory listing page and the files it links to.
#[derive(Debug, Clone)]
pub struct HttpIndex {
    session: HttpSession,
    base_url: String,
}

impl HttpIndex {
    /// Index rooted at `base_url`. A trailing `/` is added if missing.
    pub fn new(session: HttpSession, base_url: &str) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        Self { session, base_url }
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of `name` under the base URL.
    pub fn file_url(&self, name: &str) -> String {
        format!("{}{name}", self.base_url)
    }
}

#[async_trait]
impl IndexSource for HttpIndex {
    async fn list(&self) -> Result<Vec<String>, FetchError> {
        tracing::info!(base_url = self.base_url, "crawling index");
        let html = self.session.get_text(&self.base_url).await?;
        let names = parse_index_listing(&html);
        tracing::info!(base_url = self.base_url, files = names.len(), "index crawled");
        Ok(names)
    }
}

#[async_trait]
impl ContentFetcher for HttpIndex {
    async fn fetch(&self, name: &str) -> Result<RemoteObject, FetchError> {
        self.session.get_bytes(&self.file_url(name)).await
    }
}

/// Extract file names from an HTML directory listing.
///
/// Every `href` is considered. Links ending in `/` (directories, including
/// the parent link), links with a query or fragment, and non-HTTP schemes
/// are dropped. The last path segment is kept. The result is deduplicated
/// and sorted.
pub fn parse_index_listing(html: &str) -> Vec<String> {
    const HREF: &str = "href=";

    let lower = html.to_ascii_lowercase();
    let mut names = BTreeSet::new();

    for (pos, _) in lower.match_indices(HREF) {
        let Some(tail) = html.get(pos.saturating_add(HREF.len())..) else {
            continue;
        };
        let tail = tail.trim_start();
        let target = match tail.chars().next() {
            Some(quote @ ('"' | '\'')) => tail.get(1..).and_then(|t| t.split(quote).next()),
            Some(_) => tail
                .split(|c: char| c.is_whitespace() || c == '>')
                .next(),
            None => None,
        };
        if let Some(name) = target.and_then(file_name) {
            names.insert(name.to_owned());
        }
    }

    names.into_iter().collect()
}

/// Last path segment of a link target, if it names a file.
fn file_name(target: &str) -> Option<&str> {
    let target = target.trim();
    let lower = target.to_ascii_lowercase();
    if target.is_empty()
        || target.ends_with('/')
        || target.contains(['?', '#'])
        || lower.starts_with("mailto:")
        || lower.starts_with("javascript:")
    {
        return None;
    }
    let name = target.rsplit('/').next()?;
    match name {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}
