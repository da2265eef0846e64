//! Shared type definitions for the Quest dataset jobs.
//!
//! This crate is the single source of truth for the data model shared by the
//! storage layer, the ingest jobs, and the analytics engine.
//!
//! # Modules
//!
//! - [`location`] -- Bucket + prefix addressing for stored objects
//! - [`numeric`] -- Lenient parsing of numeric cells
//! - [`period`] -- Typed BLS period codes (quarters vs. annual aggregates)
//! - [`records`] -- Parsed dataset rows (series observations, population)
//! - [`sync`] -- Outcome record of one reconciliation run

pub mod location;
pub mod numeric;
pub mod period;
pub mod records;
pub mod sync;

// Re-export all public types at crate root for convenience.
pub use location::StoreLocation;
pub use numeric::{parse_decimal, parse_year};
pub use period::{Period, Quarter};
pub use records::{PopulationRecord, SeriesRecord};
pub use sync::SyncResult;
