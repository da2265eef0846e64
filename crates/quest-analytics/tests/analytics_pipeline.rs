//! End-to-end analytics runs against an in-memory store.

#![allow(
    clippy::arithmetic_side_effects,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use rust_decimal::Decimal;

use quest_analytics::pipeline::{BEST_YEAR_OUTPUT, JOIN_OUTPUT, STATS_OUTPUT};
use quest_analytics::{AnalyticsConfig, AnalyticsError, run_analytics};
use quest_store::{BlobStore, MemoryStore, StoreError, TableError, TableFormat, write_table};
use quest_types::StoreLocation;

const BUCKET: &str = "quest-data";

const SERIES_FILE: &str = "series_id        \tyear\tperiod\t       value\tfootnote_codes\n\
PRS30006032      \t2018\tQ01\t       1.9\t\n\
PRS30006032      \t2018\tQ02\t       0.5\t\n\
PRS30006032      \t2019\tQ01\t      -0.6\t\n\
PRS30006032      \t2019\tQ05\t      20.0\t\n\
PRS30006032      \t2020\tQ01\t         -\tR\n\
S1               \t2019\tQ01\t        10\t\n\
S1               \t2019\tQ02\t        20\t\n\
S1               \t2020\tQ01\t         5\t\n";

fn bls() -> StoreLocation {
    StoreLocation::new(BUCKET, "bls/")
}

fn tables() -> StoreLocation {
    StoreLocation::new(BUCKET, "population/tables/")
}

fn outputs() -> StoreLocation {
    StoreLocation::new(BUCKET, "analytics/")
}

fn population_batch(rows: &[(i32, f64)]) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("year", DataType::Int32, true),
        Field::new("nation", DataType::Utf8, true),
        Field::new("population", DataType::Float64, true),
    ]);
    let years: Vec<i32> = rows.iter().map(|(y, _)| *y).collect();
    let nations: Vec<&str> = rows.iter().map(|_| "United States").collect();
    let counts: Vec<f64> = rows.iter().map(|(_, c)| *c).collect();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(years)),
        Arc::new(StringArray::from(nations)),
        Arc::new(Float64Array::from(counts)),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).expect("valid batch")
}

async fn seeded_store(population: &[(i32, f64)]) -> MemoryStore {
    let store = MemoryStore::with_buckets([BUCKET]);
    store
        .put(
            BUCKET,
            "bls/pr.data.0.Current",
            Bytes::from_static(SERIES_FILE.as_bytes()),
            "text/plain",
        )
        .await
        .unwrap();
    write_table(
        &store,
        &tables(),
        "population.parquet",
        &population_batch(population),
        TableFormat::Parquet,
    )
    .await
    .unwrap();
    store
}

#[tokio::test]
async fn full_run_computes_every_result() {
    let store = seeded_store(&[(2013, 10.0), (2014, 20.0), (2018, 30.0), (2019, 40.0)]).await;
    let report = run_analytics(&AnalyticsConfig::new(bls(), tables()), &store)
        .await
        .unwrap();

    assert_eq!(report.population_stats.year_range, "2013-2018");
    assert_eq!(report.population_stats.mean, Some(Decimal::from(20)));
    let std = report.population_stats.std.expect("two or more values");
    assert!((std - Decimal::from(10)).abs() < Decimal::new(1, 9));

    let best: Vec<(&str, i32, Decimal)> = report
        .best_year
        .iter()
        .map(|b| (b.series_id.as_str(), b.year, b.value))
        .collect();
    assert_eq!(
        best,
        vec![
            ("PRS30006032", 2018, Decimal::new(24, 1)),
            ("S1", 2019, Decimal::from(30)),
        ]
    );

    let joined = &report.series_population;
    assert_eq!(joined.len(), 3);
    assert_eq!(joined[0].year, Some(2018));
    assert_eq!(joined[0].value, Some(Decimal::new(19, 1)));
    assert_eq!(joined[0].population, Some(Decimal::from(30)));
    assert_eq!(joined[1].population, Some(Decimal::from(40)));
    assert_eq!(joined[2].year, Some(2020));
    assert_eq!(joined[2].value, None);
    assert_eq!(joined[2].population, None);

    assert_eq!(report.table_rows()[JOIN_OUTPUT], 3);
}

#[tokio::test]
async fn results_are_written_when_output_is_configured() {
    let store = seeded_store(&[(2015, 1.0)]).await;
    let config = AnalyticsConfig::new(bls(), tables()).with_output(outputs());
    let report = run_analytics(&config, &store).await.unwrap();

    let stats = store.get(BUCKET, "analytics/population_stats.json").await.unwrap();
    let stats: serde_json::Value = serde_json::from_slice(&stats).unwrap();
    assert_eq!(
        stats,
        serde_json::json!({ "year_range": "2013-2018", "mean": 1.0, "std": null })
    );

    let best = store.get(BUCKET, "analytics/best_year.json").await.unwrap();
    let best: serde_json::Value = serde_json::from_slice(&best).unwrap();
    assert_eq!(best.as_array().map(Vec::len), Some(report.best_year.len()));
    assert_eq!(best[1], serde_json::json!({ "series_id": "S1", "year": 2019, "value": 30.0 }));

    let listed = store.list(BUCKET, "analytics/").await.unwrap();
    let expected: Vec<String> = [BEST_YEAR_OUTPUT, STATS_OUTPUT, JOIN_OUTPUT]
        .iter()
        .map(|name| format!("analytics/{name}"))
        .collect();
    assert_eq!(listed.into_iter().collect::<Vec<_>>(), expected);
}

#[tokio::test]
async fn missing_series_object_fails_without_writing() {
    let store = MemoryStore::with_buckets([BUCKET]);
    let config = AnalyticsConfig::new(bls(), tables()).with_output(outputs());
    let err = run_analytics(&config, &store).await.unwrap_err();
    assert!(matches!(
        err,
        AnalyticsError::Table(TableError::Store(StoreError::NotFound { .. }))
    ));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn population_without_required_columns_is_rejected() {
    let store = seeded_store(&[(2015, 1.0)]).await;
    let wrong = Schema::new(vec![
        Field::new("Year", DataType::Int32, true),
        Field::new("Population", DataType::Float64, true),
    ]);
    let batch = RecordBatch::try_new(
        Arc::new(wrong),
        vec![
            Arc::new(Int32Array::from(vec![2015])) as ArrayRef,
            Arc::new(Float64Array::from(vec![1.0])) as ArrayRef,
        ],
    )
    .unwrap();
    write_table(&store, &tables(), "population.parquet", &batch, TableFormat::Parquet)
        .await
        .unwrap();

    let err = run_analytics(&AnalyticsConfig::new(bls(), tables()), &store)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AnalyticsError::MissingColumns { ref table, ref columns }
            if table == "population" && columns == &["year", "nation", "population"]
    ));
}

#[tokio::test]
async fn population_csv_variant_is_supported() {
    let store = seeded_store(&[]).await;
    store
        .put(
            BUCKET,
            "population/tables/population.csv",
            Bytes::from_static(b"year,nation,population\n2013,United States,316128839\n2014,United States,318857056\n"),
            "text/csv",
        )
        .await
        .unwrap();
    let mut config = AnalyticsConfig::new(bls(), tables());
    config.population.name = String::from("population.csv");
    config.population.format = TableFormat::Csv;

    let report = run_analytics(&config, &store).await.unwrap();
    assert_eq!(report.population_stats.mean, Some(Decimal::new(3_174_929_475, 1)));
}
