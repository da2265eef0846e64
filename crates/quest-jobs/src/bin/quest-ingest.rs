//! Ingest job entry point.
//!
//! Mirrors the BLS time-series index into `bls/` and stores the DataUSA
//! population response and tables, then prints the run summary as JSON.

use anyhow::Context;
use tracing::info;

use quest_ingest::{HttpIndex, HttpSession};
use quest_jobs::{JobConfig, build_store, init_tracing, run_ingest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("quest-ingest starting");

    let config = JobConfig::load().context("loading configuration")?;
    info!(
        backend = ?config.storage.backend,
        bucket = config.storage.bucket,
        index_url = config.bls.index_url,
        "configuration loaded"
    );

    let store = build_store(&config.storage).context("building object store")?;
    let session = HttpSession::new(&config.http.contact_email, config.http.timeout())
        .context("building HTTP session")?;
    let index = HttpIndex::new(session.clone(), &config.bls.index_url);

    let summary = run_ingest(&config, store.as_ref(), &index, &session)
        .await
        .context("ingest run failed")?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
