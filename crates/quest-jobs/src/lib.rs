//! Job orchestrators for the Quest dataset pipeline.
//!
//! Two jobs, each shipped as a binary:
//!
//! - `quest-ingest` mirrors the BLS productivity index into the bucket and
//!   refreshes the DataUSA population dataset.
//! - `quest-analytics` reads both datasets back and computes the population
//!   statistics, the best year per series, and the series/population join.
//!
//! Both load a [`JobConfig`], build the configured [`BlobStore`](quest_store::BlobStore),
//! run, and print a JSON summary.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`store`] -- Store construction
//! - [`jobs`] -- The ingest and analytics runs
//! - [`telemetry`] -- Tracing subscriber setup
//! - [`error`] -- Shared error type

pub mod config;
pub mod error;
pub mod jobs;
pub mod store;
pub mod telemetry;

// Re-export primary types for convenience.
pub use config::{BackendKind, ConfigError, JobConfig};
pub use error::JobError;
pub use jobs::{AnalyticsSummary, IngestSummary, run_analytics, run_ingest};
pub use store::build_store;
pub use telemetry::init_tracing;
