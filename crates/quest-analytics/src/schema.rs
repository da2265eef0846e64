//! Typed record extraction from record batches.
//!
//! Every column is read through its text form, so the same code handles a
//! CSV-decoded all-UTF-8 batch and a typed Parquet batch. Cells are trimmed;
//! empty cells are null. Unparseable numeric cells are null too and are
//! reported in a single warning per table.

use arrow::array::AsArray;
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use quest_types::{Period, PopulationRecord, SeriesRecord, parse_decimal, parse_year};

use crate::error::AnalyticsError;

/// Columns a series table must have. `footnote_codes` is optional.
pub const SERIES_COLUMNS: [&str; 4] = ["series_id", "year", "period", "value"];

/// Columns a population table must have.
pub const POPULATION_COLUMNS: [&str; 3] = ["year", "nation", "population"];

/// Extract [`SeriesRecord`]s, one per row.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingColumns`] naming every absent column of
/// [`SERIES_COLUMNS`].
pub fn series_records(batch: &RecordBatch) -> Result<Vec<SeriesRecord>, AnalyticsError> {
    require_columns(batch, "series", &SERIES_COLUMNS)?;

    let ids = text_column(batch, "series_id")?;
    let years = text_column(batch, "year")?;
    let periods = text_column(batch, "period")?;
    let values = text_column(batch, "value")?;
    let footnotes = match batch.column_by_name("footnote_codes") {
        Some(_) => text_column(batch, "footnote_codes")?,
        None => vec![None; batch.num_rows()],
    };

    let mut malformed = 0_usize;
    let mut records = Vec::with_capacity(batch.num_rows());
    let rows = ids.into_iter().zip(years).zip(periods).zip(values).zip(footnotes);
    for ((((id, year), period), value), footnote_codes) in rows {
        let parsed_year = year.as_deref().and_then(parse_year);
        let parsed_value = value.as_deref().and_then(parse_decimal);
        malformed = malformed
            .saturating_add(usize::from(year.is_some() && parsed_year.is_none()))
            .saturating_add(usize::from(value.is_some() && parsed_value.is_none()));

        records.push(SeriesRecord {
            series_id: id.unwrap_or_default(),
            year: parsed_year,
            period: Period::parse(period.as_deref().unwrap_or_default()),
            value: parsed_value,
            footnote_codes,
        });
    }

    report_malformed("series", malformed);
    Ok(records)
}

/// Extract [`PopulationRecord`]s, one per row.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingColumns`] naming every absent column of
/// [`POPULATION_COLUMNS`].
pub fn population_records(batch: &RecordBatch) -> Result<Vec<PopulationRecord>, AnalyticsError> {
    require_columns(batch, "population", &POPULATION_COLUMNS)?;

    let years = text_column(batch, "year")?;
    let nations = text_column(batch, "nation")?;
    let counts = text_column(batch, "population")?;

    let mut malformed = 0_usize;
    let mut records = Vec::with_capacity(batch.num_rows());
    for ((year, nation), count) in years.into_iter().zip(nations).zip(counts) {
        let parsed_year = year.as_deref().and_then(parse_year);
        let parsed_count = count.as_deref().and_then(parse_decimal);
        malformed = malformed
            .saturating_add(usize::from(year.is_some() && parsed_year.is_none()))
            .saturating_add(usize::from(count.is_some() && parsed_count.is_none()));

        records.push(PopulationRecord {
            year: parsed_year,
            nation: nation.unwrap_or_default(),
            population: parsed_count,
        });
    }

    report_malformed("population", malformed);
    Ok(records)
}

fn require_columns(batch: &RecordBatch, table: &str, required: &[&str]) -> Result<(), AnalyticsError> {
    let schema = batch.schema();
    let missing: Vec<String> = required
        .iter()
        .filter(|name| schema.column_with_name(name).is_none())
        .map(|name| (*name).to_owned())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalyticsError::MissingColumns {
            table: table.to_owned(),
            columns: missing,
        })
    }
}

/// A column's cells as trimmed text, empty cells as `None`.
fn text_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<String>>, AnalyticsError> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| AnalyticsError::MissingColumns {
            table: String::from("input"),
            columns: vec![name.to_owned()],
        })?;
    let text = cast(column, &DataType::Utf8)?;
    Ok(text
        .as_string::<i32>()
        .iter()
        .map(|cell| {
            cell.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
        })
        .collect())
}

fn report_malformed(table: &str, malformed: usize) {
    if malformed > 0 {
        tracing::warn!(table, malformed, "unparseable numeric cells treated as null");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::indexing_slicing)]

    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use rust_decimal::Decimal;

    use super::*;

    fn utf8_batch(columns: &[(&str, Vec<Option<&str>>)]) -> RecordBatch {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Utf8, true))
            .collect();
        let arrays: Vec<ArrayRef> = columns
            .iter()
            .map(|(_, cells)| Arc::new(StringArray::from(cells.clone())) as ArrayRef)
            .collect();
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).expect("valid batch")
    }

    #[test]
    fn series_rows_are_trimmed_and_typed() {
        let batch = utf8_batch(&[
            ("series_id", vec![Some("PRS30006032     ")]),
            ("year", vec![Some("2019")]),
            ("period", vec![Some("Q01")]),
            ("value", vec![Some("   1.7")]),
            ("footnote_codes", vec![Some("R")]),
        ]);
        let records = series_records(&batch).expect("extracts");
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.series_id, "PRS30006032");
        assert_eq!(r.year, Some(2019));
        assert!(r.period.is_quarter());
        assert_eq!(r.value, Some(Decimal::new(17, 1)));
        assert_eq!(r.footnote_codes.as_deref(), Some("R"));
    }

    #[test]
    fn malformed_cells_become_null_without_dropping_rows() {
        let batch = utf8_batch(&[
            ("series_id", vec![Some("S1"), Some("S1"), Some("S1")]),
            ("year", vec![Some("2019"), Some("20x9"), None]),
            ("period", vec![Some("Q01"), Some("Q02"), Some("Q03")]),
            ("value", vec![Some("-"), Some("2"), Some("")]),
        ]);
        let records = series_records(&batch).expect("extracts");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].value, None);
        assert_eq!(records[1].year, None);
        assert_eq!(records[1].value, Some(Decimal::new(2, 0)));
        assert_eq!(records[2].year, None);
        assert_eq!(records[2].value, None);
        assert!(records.iter().all(|r| r.footnote_codes.is_none()));
    }

    #[test]
    fn missing_series_columns_are_all_named() {
        let batch = utf8_batch(&[("series_id", vec![Some("S1")]), ("period", vec![Some("Q01")])]);
        let err = series_records(&batch).expect_err("schema error");
        assert!(matches!(
            err,
            AnalyticsError::MissingColumns { ref table, ref columns }
                if table == "series" && columns == &["year", "value"]
        ));
        assert_eq!(
            err.to_string(),
            "series table is missing required columns: year, value"
        );
    }

    #[test]
    fn population_accepts_typed_columns() {
        let schema = Schema::new(vec![
            Field::new("year", DataType::Int64, true),
            Field::new("nation", DataType::Utf8, true),
            Field::new("population", DataType::Float64, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![Some(2013), None])),
                Arc::new(StringArray::from(vec!["United States", "United States"])),
                Arc::new(Float64Array::from(vec![Some(316_128_839.0), Some(1.5)])),
            ],
        )
        .expect("valid batch");
        let records = population_records(&batch).expect("extracts");
        assert_eq!(
            records[0],
            PopulationRecord::new(2013, "United States", Decimal::new(316_128_839, 0))
        );
        assert_eq!(records[1].year, None);
        assert_eq!(records[1].population, Some(Decimal::new(15, 1)));
    }

    #[test]
    fn missing_population_columns_fail_fast() {
        let batch = utf8_batch(&[("Year", vec![Some("2013")])]);
        let err = population_records(&batch).expect_err("schema error");
        assert!(matches!(
            err,
            AnalyticsError::MissingColumns { ref columns, .. }
                if columns == &["year", "nation", "population"]
        ));
    }

    #[test]
    fn empty_table_without_schema_reports_every_column() {
        let batch = RecordBatch::new_empty(Arc::new(Schema::empty()));
        let err = series_records(&batch).expect_err("schema error");
        assert!(matches!(err, AnalyticsError::MissingColumns { ref columns, .. } if columns.len() == 4));
    }
}
