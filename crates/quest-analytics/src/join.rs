//! Series/population join.
//!
//! Selects one `(series_id, period)` pair from the series table and attaches
//! the population of the matching year. Every selected row is kept; rows
//! without a match carry a null population. Population years that repeat
//! produce one output row per match.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use quest_types::{Period, PopulationRecord, SeriesRecord};

/// Series and period to select before the join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTarget {
    /// Series identifier, compared after trimming.
    pub series_id: String,
    /// Period to keep.
    pub period: Period,
}

impl JoinTarget {
    /// Build a target from its series identifier and period code.
    pub fn new(series_id: &str, period: &str) -> Self {
        Self {
            series_id: series_id.trim().to_owned(),
            period: Period::parse(period),
        }
    }
}

impl Default for JoinTarget {
    fn default() -> Self {
        Self::new("PRS30006032", "Q01")
    }
}

/// One joined row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPopulation {
    /// Series identifier.
    pub series_id: String,
    /// Observation year.
    pub year: Option<i32>,
    /// Observation period.
    pub period: Period,
    /// Observed value.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub value: Option<Decimal>,
    /// Population of the same year, if any.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub population: Option<Decimal>,
}

/// Left-join the target rows of `series` to `population` on year.
///
/// Output follows the order of `series`; matches for one row follow the order
/// of `population`. Null years never match.
pub fn series_with_population(
    series: &[SeriesRecord],
    population: &[PopulationRecord],
    target: &JoinTarget,
) -> Vec<SeriesPopulation> {
    let mut by_year: HashMap<i32, Vec<Option<Decimal>>> = HashMap::new();
    for record in population {
        if let Some(year) = record.year {
            by_year.entry(year).or_default().push(record.population);
        }
    }

    let selected = series
        .iter()
        .filter(|r| r.series_id == target.series_id && r.period == target.period);

    let mut joined = Vec::new();
    for record in selected {
        let joined_row = |population: Option<Decimal>| SeriesPopulation {
            series_id: record.series_id.clone(),
            year: record.year,
            period: record.period.clone(),
            value: record.value,
            population,
        };
        match record.year.and_then(|y| by_year.get(&y)) {
            Some(matches) => joined.extend(matches.iter().copied().map(joined_row)),
            None => joined.push(joined_row(None)),
        }
    }
    joined
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::indexing_slicing)]

    use super::*;

    fn series(id: &str, year: i32, period: &str, value: i64) -> SeriesRecord {
        SeriesRecord::new(id, year, period, Decimal::from(value))
    }

    fn pop(year: i32, count: i64) -> PopulationRecord {
        PopulationRecord::new(year, "United States", Decimal::from(count))
    }

    #[test]
    fn default_target() {
        let target = JoinTarget::default();
        assert_eq!(target.series_id, "PRS30006032");
        assert_eq!(target.period.to_string(), "Q01");
    }

    #[test]
    fn selects_target_rows_and_attaches_population() {
        let rows = vec![
            series("PRS30006032", 2018, "Q01", 1),
            series("PRS30006032", 2018, "Q02", 2),
            series("PRS30006033", 2018, "Q01", 3),
            series("PRS30006032", 2019, "Q01", 4),
        ];
        let joined = series_with_population(&rows, &[pop(2018, 327), pop(2019, 328)], &JoinTarget::default());
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].year, Some(2018));
        assert_eq!(joined[0].value, Some(Decimal::from(1)));
        assert_eq!(joined[0].population, Some(Decimal::from(327)));
        assert_eq!(joined[1].population, Some(Decimal::from(328)));
    }

    #[test]
    fn unmatched_rows_are_kept_with_null_population() {
        let mut no_year = series("PRS30006032", 0, "Q01", 7);
        no_year.year = None;
        let rows = vec![series("PRS30006032", 1995, "Q01", 5), no_year];
        let joined = series_with_population(&rows, &[pop(2013, 316), pop(2013, 317)], &JoinTarget::default());
        assert_eq!(joined.len(), 2);
        assert!(joined.iter().all(|r| r.population.is_none()));
    }

    #[test]
    fn duplicate_population_years_multiply_rows() {
        let rows = vec![series("PRS30006032", 2013, "Q01", 1)];
        let joined = series_with_population(&rows, &[pop(2013, 100), pop(2013, 101)], &JoinTarget::default());
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].population, Some(Decimal::from(100)));
        assert_eq!(joined[1].population, Some(Decimal::from(101)));
    }

    #[test]
    fn custom_target_matches_trimmed_id() {
        let rows = vec![series("S9", 2020, "Q03", 1), series("S9", 2020, "Q01", 2)];
        let joined = series_with_population(&rows, &[], &JoinTarget::new(" S9 ", "Q03"));
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].value, Some(Decimal::from(1)));
        assert_eq!(joined[0].population, None);
    }

    #[test]
    fn serializes_period_as_code() {
        let joined = series_with_population(
            &[series("PRS30006032", 2013, "Q01", 2)],
            &[pop(2013, 316)],
            &JoinTarget::default(),
        );
        let json = serde_json::to_value(&joined).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!([{
                "series_id": "PRS30006032",
                "year": 2013,
                "period": "Q01",
                "value": 2.0,
                "population": 316.0
            }])
        );
    }
}
