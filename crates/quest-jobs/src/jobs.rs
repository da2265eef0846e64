//! The two job runs.
//!
//! Each run gets a UUID v7 `run_id`, attached to a span that wraps all of its
//! logging, and returns a serializable summary for the caller to print.
//!
//! ```text
//! run_ingest:    BLS index --reconcile--> bls/          DataUSA API --> population/raw/ + population/tables/
//! run_analytics: bls/ + population/tables/ --> stats, best year, join --> (optional) analytics output
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use quest_analytics::AnalyticsReport;
use quest_ingest::{ContentFetcher, IndexSource, JsonSource, fetch_and_store, perform_sync};
use quest_store::BlobStore;
use quest_types::SyncResult;

use crate::config::JobConfig;
use crate::error::JobError;

/// Outcome of one ingest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Run identifier, also present on every log line of the run.
    pub run_id: Uuid,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Objects the BLS sync uploaded and deleted.
    pub bls: SyncResult,
    /// Rows in the normalized population table.
    pub population_rows: usize,
}

/// Outcome of one analytics run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    /// Run identifier.
    pub run_id: Uuid,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Row count per result table.
    pub tables: BTreeMap<String, usize>,
    /// The computed results.
    #[serde(skip)]
    pub report: AnalyticsReport,
}

/// Mirror the BLS index and refresh the population dataset.
///
/// The BLS sync runs first; the population fetch only runs if it succeeds.
///
/// # Errors
///
/// Returns [`JobError::Sync`] (possibly carrying a partial result) or
/// [`JobError::Ingest`].
pub async fn run_ingest<S, R, J>(
    config: &JobConfig,
    store: &S,
    index: &R,
    population: &J,
) -> Result<IngestSummary, JobError>
where
    S: BlobStore + ?Sized,
    R: IndexSource + ContentFetcher + ?Sized,
    J: JsonSource + ?Sized,
{
    let run_id = Uuid::now_v7();
    let span = tracing::info_span!("ingest", %run_id);

    async move {
        tracing::info!(bucket = config.storage.bucket, "ingest run starting");

        let bls = perform_sync(&config.bls_sync(), store, index).await?;
        let population_rows = fetch_and_store(&config.datausa(), store, population).await?;

        tracing::info!(
            uploaded = bls.uploaded.len(),
            deleted = bls.deleted.len(),
            population_rows,
            "ingest run complete"
        );
        Ok::<_, JobError>(IngestSummary {
            run_id,
            finished_at: Utc::now(),
            bls,
            population_rows,
        })
    }
    .instrument(span)
    .await
}

/// Compute the analytics results over what the ingest job stored.
///
/// # Errors
///
/// Returns [`JobError::Analytics`] if an input is missing or malformed, or an
/// output cannot be written.
pub async fn run_analytics<S>(config: &JobConfig, store: &S) -> Result<AnalyticsSummary, JobError>
where
    S: BlobStore + ?Sized,
{
    let run_id = Uuid::now_v7();
    let span = tracing::info_span!("analytics", %run_id);

    async move {
        let report = quest_analytics::run_analytics(&config.analytics(), store).await?;
        let tables = report.table_rows();
        tracing::info!(?tables, "analytics run complete");
        Ok::<_, JobError>(AnalyticsSummary {
            run_id,
            finished_at: Utc::now(),
            tables,
            report,
        })
    }
    .instrument(span)
    .await
}
