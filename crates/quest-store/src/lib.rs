//! Object store facade and tabular loader for the Quest dataset jobs.
//!
//! Every component that touches stored bytes goes through the [`BlobStore`]
//! trait, which addresses objects by `(bucket, key)`. Store instances are
//! always passed explicitly; there is no process-wide store.
//!
//! # Architecture
//!
//! ```text
//! Reconciliation Engine --+
//!                         +--> BlobStore --+--> MemoryStore          (tests, local runs)
//! Tabular Loader ---------+                +--> ObjectStoreBackend   (local FS, S3)
//! ```
//!
//! # Modules
//!
//! - [`blob`] -- The [`BlobStore`] trait and JSON helper
//! - [`memory`] -- In-memory store keyed by `(bucket, key)`
//! - [`backend`] -- [`object_store`]-backed store for local directories and S3
//! - [`table`] -- CSV / Parquet decoding and encoding over Arrow record batches
//! - [`error`] -- Shared error types

pub mod backend;
pub mod blob;
pub mod error;
pub mod memory;
pub mod table;

// Re-export primary types for convenience.
pub use backend::ObjectStoreBackend;
pub use blob::{BlobStore, put_json};
pub use error::{StoreError, TableError};
pub use memory::MemoryStore;
pub use table::{TableFormat, decode_table, encode_table, read_table, write_table};
