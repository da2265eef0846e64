//! Population summary statistics.
//!
//! Mean and sample standard deviation (N-1 denominator) of the populations
//! whose year falls inside an inclusive window. Rows with a null year or a
//! null population do not count towards N.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use quest_types::PopulationRecord;

/// An inclusive range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    /// First year included.
    pub low: i32,
    /// Last year included.
    pub high: i32,
}

impl YearWindow {
    /// Build a window. A window with `low > high` contains no year.
    pub const fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    /// True if `year` lies within `low..=high`.
    pub const fn contains(self, year: i32) -> bool {
        self.low <= year && year <= self.high
    }

    /// The `"{low}-{high}"` label used in output rows.
    pub fn label(self) -> String {
        format!("{}-{}", self.low, self.high)
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self::new(2013, 2018)
    }
}

/// Single-row summary of the population table over a year window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Window label, e.g. `2013-2018`.
    pub year_range: String,
    /// Arithmetic mean. `None` when no row qualifies.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub mean: Option<Decimal>,
    /// Sample standard deviation. `None` with fewer than two qualifying rows.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub std: Option<Decimal>,
}

/// Summarize populations whose year lies inside `window`.
pub fn population_stats(records: &[PopulationRecord], window: YearWindow) -> PopulationStats {
    let values: Vec<Decimal> = records
        .iter()
        .filter(|r| r.year.is_some_and(|y| window.contains(y)))
        .filter_map(|r| r.population)
        .collect();

    let mean = mean(&values);
    let std = mean.and_then(|m| sample_std(&values, m));
    tracing::debug!(window = %window.label(), n = values.len(), "population stats");

    PopulationStats {
        year_range: window.label(),
        mean,
        std,
    }
}

fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    sum.checked_div(Decimal::from(values.len()))
}

fn sample_std(values: &[Decimal], mean: Decimal) -> Option<Decimal> {
    let denominator = values.len().checked_sub(1).filter(|d| *d > 0)?;
    let squares = values.iter().try_fold(Decimal::ZERO, |acc, v| {
        let delta = v.checked_sub(mean)?;
        acc.checked_add(delta.checked_mul(delta)?)
    })?;
    squares.checked_div(Decimal::from(denominator))?.sqrt()
}
