//! Per-series winning year.
//!
//! For every series, quarterly values are summed per year and the year with
//! the largest sum is reported. Only [`Period::Quarter`](quest_types::Period)
//! rows count, so annual averages (`Q05`, `M13`) never inflate a year.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use quest_types::SeriesRecord;

/// The winning year of one series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestYear {
    /// Series identifier.
    pub series_id: String,
    /// Year with the largest quarterly sum.
    pub year: i32,
    /// That year's quarterly sum.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

/// One row per series that has at least one quarterly row with a known year
/// and a sum that fits in a [`Decimal`].
///
/// Null values add nothing to a year's sum; a year whose values are all null
/// still competes, with sum zero. Ties go to the smallest year. Rows with a
/// null year are excluded, as is a year whose sum overflows. Output is
/// ordered by `series_id`.
pub fn best_year_by_series(records: &[SeriesRecord]) -> Vec<BestYear> {
    // `None` marks a year whose sum overflowed.
    let mut sums: BTreeMap<(&str, i32), Option<Decimal>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.period.is_quarter()) {
        let Some(year) = record.year else { continue };
        let sum = sums
            .entry((record.series_id.as_str(), year))
            .or_insert(Some(Decimal::ZERO));
        *sum = sum.and_then(|s| s.checked_add(record.value.unwrap_or_default()));
    }

    // Keys iterate by series, then by ascending year; a strict comparison
    // keeps the earliest year among equal sums.
    let mut best: Vec<BestYear> = Vec::new();
    for ((series_id, year), sum) in sums {
        let Some(sum) = sum else {
            tracing::warn!(series_id, year, "quarterly sum overflowed, year skipped");
            continue;
        };
        match best.last_mut() {
            Some(current) if current.series_id == series_id => {
                if sum > current.value {
                    current.year = year;
                    current.value = sum;
                }
            }
            _ => best.push(BestYear {
                series_id: series_id.to_owned(),
                year,
                value: sum,
            }),
        }
    }
    best
}
