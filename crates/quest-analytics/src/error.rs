//! Error types for the analytics engine.
//!
//! Malformed cells are never errors; they become nulls. What is an error is a
//! table that lacks a required column, or a dataset that cannot be loaded.

use quest_store::{StoreError, TableError};

/// Errors that can occur while loading or aggregating tables.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Required columns are absent from a table.
    #[error("{table} table is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        /// Which input table.
        table: String,
        /// Every missing column, in schema order.
        columns: Vec<String>,
    },

    /// A dataset could not be read or decoded.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A result table could not be written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A column could not be converted to text.
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
