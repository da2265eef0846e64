//! Parsed dataset rows.
//!
//! Numeric cells that fail to parse are carried as `None` rather than dropped,
//! so a malformed value never shrinks a table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::Period;

/// One observation from the labor-statistics series file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRecord {
    /// Series identifier (e.g. `PRS30006032`).
    pub series_id: String,
    /// Observation year. `None` if the cell was not an integer.
    pub year: Option<i32>,
    /// Observation period.
    pub period: Period,
    /// Observed value. `None` if the cell was not numeric.
    pub value: Option<Decimal>,
    /// Footnote codes, opaque.
    pub footnote_codes: Option<String>,
}

impl SeriesRecord {
    /// Convenience constructor for a fully populated record.
    pub fn new(series_id: &str, year: i32, period: &str, value: Decimal) -> Self {
        Self {
            series_id: series_id.to_owned(),
            year: Some(year),
            period: Period::parse(period),
            value: Some(value),
            footnote_codes: None,
        }
    }
}

/// One row of the per-year population table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRecord {
    /// Year the count refers to. `None` if the cell was not an integer.
    pub year: Option<i32>,
    /// Nation name (e.g. `United States`).
    pub nation: String,
    /// Population count. `None` if the cell was not numeric.
    pub population: Option<Decimal>,
}

impl PopulationRecord {
    /// Convenience constructor for a fully populated record.
    pub fn new(year: i32, nation: &str, population: Decimal) -> Self {
        Self {
            year: Some(year),
            nation: nation.to_owned(),
            population: Some(population),
        }
    }
}
