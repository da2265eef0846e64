//! DataUSA population fetch.
//!
//! The API returns `{"data": [{"Year": 2013, "Nation": "United States",
//! "Population": 316128839, ...}, ...]}`. The raw document is archived as-is
//! and a normalized `year, nation, population` table is written in both
//! Parquet and CSV.

use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quest_store::{BlobStore, TableFormat, put_json, write_table};
use quest_types::{PopulationRecord, StoreLocation, parse_decimal, parse_year};

use crate::error::IngestError;
use crate::source::JsonSource;

/// US total population by year, nation-level drilldown.
pub const DEFAULT_API_URL: &str = "https://honolulu-api.datausa.io/tesseract/data.jsonrecords?\
cube=acs_yg_total_population_1&drilldowns=Year%2CNation&locale=en&measures=Population";

/// Name of the archived raw response.
pub const RAW_OBJECT: &str = "population.json";
/// Name of the normalized Parquet table.
pub const PARQUET_OBJECT: &str = "population.parquet";
/// Name of the normalized CSV table.
pub const CSV_OBJECT: &str = "population.csv";

/// Fields every population record set must carry.
const REQUIRED_FIELDS: [&str; 3] = ["Year", "Nation", "Population"];

/// Where the population fetch reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataUsaConfig {
    /// Destination bucket.
    pub bucket: String,
    /// Prefix for the raw JSON response.
    pub raw_prefix: String,
    /// Prefix for the normalized tables.
    pub table_prefix: String,
    /// API URL.
    pub api_url: String,
}

impl DataUsaConfig {
    /// Raw response namespace.
    pub fn raw_destination(&self) -> StoreLocation {
        StoreLocation::new(&self.bucket, &self.raw_prefix)
    }

    /// Normalized table namespace.
    pub fn table_destination(&self) -> StoreLocation {
        StoreLocation::new(&self.bucket, &self.table_prefix)
    }
}

/// Convert API records into [`PopulationRecord`]s.
///
/// Each required field must appear in at least one record; a record lacking
/// a field, or holding a non-numeric year or population, yields a null cell
/// rather than an error.
///
/// # Errors
///
/// Returns [`IngestError::MissingFields`] naming every required field absent
/// from the whole set (so an empty set fails), or
/// [`IngestError::InvalidRecord`] if a record is not an object.
pub fn normalize_records(records: &[Value]) -> Result<Vec<PopulationRecord>, IngestError> {
    let mut seen = BTreeSet::new();
    for (index, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .ok_or(IngestError::InvalidRecord { index })?;
        seen.extend(object.keys().map(String::as_str));
    }

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !seen.contains(*field))
        .map(|field| (*field).to_owned())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingFields(missing));
    }

    Ok(records
        .iter()
        .map(|record| PopulationRecord {
            year: record.get("Year").and_then(cell_text).as_deref().and_then(parse_year),
            nation: record
                .get("Nation")
                .and_then(cell_text)
                .unwrap_or_default(),
            population: record
                .get("Population")
                .and_then(cell_text)
                .as_deref()
                .and_then(parse_decimal),
        })
        .collect())
}

/// Render a JSON scalar as text; `null`, arrays and objects have none.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Arrow batch with columns `year` (Int32), `nation` (Utf8) and
/// `population` (Float64).
///
/// # Errors
///
/// Returns [`ArrowError`] if the batch cannot be assembled.
pub fn population_batch(records: &[PopulationRecord]) -> Result<RecordBatch, ArrowError> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int32, true),
        Field::new("nation", DataType::Utf8, true),
        Field::new("population", DataType::Float64, true),
    ]));

    let years: Int32Array = records.iter().map(|r| r.year).collect();
    let nations: StringArray = records.iter().map(|r| Some(r.nation.as_str())).collect();
    let population: Float64Array = records
        .iter()
        .map(|r| r.population.as_ref().and_then(Decimal::to_f64))
        .collect();

    let columns: Vec<ArrayRef> = vec![Arc::new(years), Arc::new(nations), Arc::new(population)];
    RecordBatch::try_new(schema, columns)
}

/// Fetch the population dataset and persist the raw and normalized forms.
///
/// The raw response is written before normalization, so it is archived even
/// when the records turn out to be unusable. Returns the number of rows in
/// the normalized table.
///
/// # Errors
///
/// Returns [`IngestError`] if the bucket is unreachable, the request fails,
/// the records are missing required fields, or a write fails.
pub async fn fetch_and_store<S, J>(
    config: &DataUsaConfig,
    store: &S,
    source: &J,
) -> Result<usize, IngestError>
where
    S: BlobStore + ?Sized,
    J: JsonSource + ?Sized,
{
    store.ensure_bucket(&config.bucket).await?;

    tracing::info!(url = config.api_url, "requesting DataUSA population data");
    let document = source.get_json(&config.api_url).await?;
    put_json(store, &config.raw_destination(), RAW_OBJECT, &document).await?;

    let records = document
        .get("data")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);
    let normalized = normalize_records(records)?;
    let batch = population_batch(&normalized)?;

    let tables = config.table_destination();
    write_table(store, &tables, PARQUET_OBJECT, &batch, TableFormat::Parquet).await?;
    write_table(store, &tables, CSV_OBJECT, &batch, TableFormat::Csv).await?;

    tracing::info!(
        rows = normalized.len(),
        destination = %tables,
        "population tables stored"
    );
    Ok(normalized.len())
}
