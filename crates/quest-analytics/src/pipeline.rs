//! Load, compute, persist.
//!
//! [`run_analytics`] reads the series and population tables through the
//! Tabular Loader, runs the three computations, and optionally writes each
//! result as a JSON object next to the other outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quest_store::{BlobStore, TableFormat, put_json, read_table};
use quest_types::{PopulationRecord, SeriesRecord, StoreLocation};

use crate::best_year::{BestYear, best_year_by_series};
use crate::error::AnalyticsError;
use crate::join::{JoinTarget, SeriesPopulation, series_with_population};
use crate::schema::{population_records, series_records};
use crate::stats::{PopulationStats, YearWindow, population_stats};

/// Object name of the productivity series file under the BLS prefix.
pub const SERIES_OBJECT: &str = "pr.data.0.Current";

/// Object name of the population table under the table prefix.
pub const POPULATION_OBJECT: &str = "population.parquet";

/// Output object for [`AnalyticsReport::population_stats`].
pub const STATS_OUTPUT: &str = "population_stats.json";

/// Output object for [`AnalyticsReport::best_year`].
pub const BEST_YEAR_OUTPUT: &str = "best_year.json";

/// Output object for [`AnalyticsReport::series_population`].
pub const JOIN_OUTPUT: &str = "series_population.json";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A stored table: where it lives and how it is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRef {
    /// Bucket and prefix holding the object.
    pub location: StoreLocation,
    /// Object name under the prefix.
    pub name: String,
    /// Encoding of the object.
    pub format: TableFormat,
}

impl DatasetRef {
    /// Build a dataset reference.
    pub fn new(location: StoreLocation, name: &str, format: TableFormat) -> Self {
        Self {
            location,
            name: name.to_owned(),
            format,
        }
    }

    /// The `s3://` style URI of the object, for logs.
    pub fn uri(&self) -> String {
        self.location.uri(&self.name)
    }
}

/// Inputs, parameters, and optional output location of one analytics run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// The series table (tab-separated text).
    pub series: DatasetRef,
    /// The population table.
    pub population: DatasetRef,
    /// Year window for [`population_stats`].
    pub window: YearWindow,
    /// Series and period for [`series_with_population`].
    pub target: JoinTarget,
    /// Where to write the result objects. `None` keeps results in memory.
    pub output: Option<StoreLocation>,
}

impl AnalyticsConfig {
    /// Default datasets under the given locations, default parameters, no output.
    pub fn new(bls: StoreLocation, population_tables: StoreLocation) -> Self {
        Self {
            series: DatasetRef::new(bls, SERIES_OBJECT, TableFormat::Csv),
            population: DatasetRef::new(population_tables, POPULATION_OBJECT, TableFormat::Parquet),
            window: YearWindow::default(),
            target: JoinTarget::default(),
            output: None,
        }
    }

    /// Write results under `output`.
    #[must_use]
    pub fn with_output(mut self, output: StoreLocation) -> Self {
        self.output = Some(output);
        self
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Results of one analytics run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Population mean and std over the window.
    pub population_stats: PopulationStats,
    /// Winning year per series.
    pub best_year: Vec<BestYear>,
    /// Target series rows joined to population.
    pub series_population: Vec<SeriesPopulation>,
}

impl AnalyticsReport {
    /// Row count of each result table, keyed by output object name.
    pub fn table_rows(&self) -> BTreeMap<String, usize> {
        BTreeMap::from([
            (STATS_OUTPUT.to_owned(), 1),
            (BEST_YEAR_OUTPUT.to_owned(), self.best_year.len()),
            (JOIN_OUTPUT.to_owned(), self.series_population.len()),
        ])
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read and parse the series table.
///
/// # Errors
///
/// Returns [`AnalyticsError::Table`] if the object cannot be read or decoded,
/// or [`AnalyticsError::MissingColumns`] if required columns are absent.
pub async fn load_series<S>(store: &S, dataset: &DatasetRef) -> Result<Vec<SeriesRecord>, AnalyticsError>
where
    S: BlobStore + ?Sized,
{
    let batch = read_table(store, &dataset.location, &dataset.name, dataset.format).await?;
    series_records(&batch)
}

/// Read and parse the population table.
///
/// # Errors
///
/// Same as [`load_series`].
pub async fn load_population<S>(
    store: &S,
    dataset: &DatasetRef,
) -> Result<Vec<PopulationRecord>, AnalyticsError>
where
    S: BlobStore + ?Sized,
{
    let batch = read_table(store, &dataset.location, &dataset.name, dataset.format).await?;
    population_records(&batch)
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Load both tables, compute every result, and persist them if configured.
///
/// Nothing is written unless both tables load and parse.
///
/// # Errors
///
/// Returns the first load or parse error, or [`AnalyticsError::Store`] if an
/// output cannot be written.
pub async fn run_analytics<S>(config: &AnalyticsConfig, store: &S) -> Result<AnalyticsReport, AnalyticsError>
where
    S: BlobStore + ?Sized,
{
    let series = load_series(store, &config.series).await?;
    let population = load_population(store, &config.population).await?;
    tracing::info!(
        series = config.series.uri(),
        series_rows = series.len(),
        population = config.population.uri(),
        population_rows = population.len(),
        "analytics inputs loaded"
    );

    let report = AnalyticsReport {
        population_stats: population_stats(&population, config.window),
        best_year: best_year_by_series(&series),
        series_population: series_with_population(&series, &population, &config.target),
    };

    if let Some(output) = &config.output {
        put_json(store, output, STATS_OUTPUT, &report.population_stats).await?;
        put_json(store, output, BEST_YEAR_OUTPUT, &report.best_year).await?;
        put_json(store, output, JOIN_OUTPUT, &report.series_population).await?;
        tracing::info!(output = %output, "analytics results stored");
    }

    Ok(report)
}
