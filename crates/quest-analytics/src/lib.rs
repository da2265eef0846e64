//! Aggregation and join engine for the Quest analytics job.
//!
//! Three independent, pure computations over parsed records:
//!
//! | Function | Input | Output |
//! |----------|-------|--------|
//! | [`population_stats`] | population | mean and sample std over a year window |
//! | [`best_year_by_series`] | series | per series, the year with the largest quarterly sum |
//! | [`series_with_population`] | series + population | one series/period left-joined to population by year |
//!
//! Tables arrive as Arrow record batches from the Tabular Loader;
//! [`schema`] turns them into typed records, failing fast when a required
//! column is absent and degrading malformed cells to null. [`pipeline`]
//! wires loading, the three computations, and optional persistence.
//!
//! # Modules
//!
//! - [`schema`] -- Record batch to typed record extraction
//! - [`stats`] -- Population summary statistics
//! - [`best_year`] -- Per-series winning year
//! - [`join`] -- Series/population join
//! - [`pipeline`] -- Load, compute, persist
//! - [`error`] -- Shared error types

pub mod best_year;
pub mod error;
pub mod join;
pub mod pipeline;
pub mod schema;
pub mod stats;

// Re-export primary types for convenience.
pub use best_year::{BestYear, best_year_by_series};
pub use error::AnalyticsError;
pub use join::{JoinTarget, SeriesPopulation, series_with_population};
pub use pipeline::{AnalyticsConfig, AnalyticsReport, DatasetRef, run_analytics};
pub use schema::{population_records, series_records};
pub use stats::{PopulationStats, YearWindow, population_stats};
