//! Remote index reconciliation and dataset fetchers.
//!
//! The centerpiece is the Reconciliation Engine: given the set of file names
//! a remote index advertises and a destination prefix, it uploads what is
//! missing and deletes what is no longer advertised. The diff itself is a
//! pure function ([`diff_keys`]); [`reconcile`] applies it against a
//! [`quest_store::BlobStore`].
//!
//! # Architecture
//!
//! ```text
//! IndexSource ----> desired names --+
//!                                   +--> diff_keys --> uploads / deletes --> BlobStore
//! BlobStore::list -> existing names-+        |
//!                                            +--> ContentFetcher (upload bodies)
//! ```
//!
//! # Modules
//!
//! - [`diff`] -- Pure set difference between desired and existing names
//! - [`reconcile`] -- Apply a diff to a store
//! - [`source`] -- Collaborator traits (index, content, JSON)
//! - [`http`] -- `reqwest` session and HTTP index implementation
//! - [`bls`] -- BLS time-series sync job
//! - [`population`] -- DataUSA population fetch and normalization
//! - [`error`] -- Shared error types

pub mod bls;
pub mod diff;
pub mod error;
pub mod http;
pub mod population;
pub mod reconcile;
pub mod source;

// Re-export primary types for convenience.
pub use bls::{BlsSyncConfig, perform_sync};
pub use diff::{KeyDiff, diff_keys};
pub use error::{FetchError, IngestError, SyncError};
pub use http::{HttpIndex, HttpSession, parse_index_listing};
pub use population::{DataUsaConfig, fetch_and_store, normalize_records, population_batch};
pub use reconcile::reconcile;
pub use source::{ContentFetcher, IndexSource, JsonSource, RemoteObject};
