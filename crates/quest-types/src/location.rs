//! Addressing for objects held in the Object Store Facade.
//!
//! Keys are flat, case-sensitive strings. A "prefix" is nothing more than a
//! string that every key in a namespace starts with; no hierarchy is implied.

use serde::{Deserialize, Serialize};

/// A bucket plus a key prefix that together name a namespace of objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StoreLocation {
    /// Bucket name.
    pub bucket: String,
    /// Key prefix prepended to every bare name (may be empty).
    pub prefix: String,
}

impl StoreLocation {
    /// Create a location from a bucket and a prefix.
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Full object key for a bare name (`prefix + name`).
    pub fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    /// Strip this location's prefix from a full key, yielding the bare name.
    ///
    /// Returns `None` if the key does not live under this prefix.
    pub fn bare_name<'a>(&self, full_key: &'a str) -> Option<&'a str> {
        full_key.strip_prefix(self.prefix.as_str())
    }

    /// `s3://bucket/prefix+name` URI, used for logging.
    pub fn uri(&self, name: &str) -> String {
        format!("s3://{}/{}", self.bucket, self.key(name))
    }
}

impl core::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.prefix)
    }
}
