//! Analytics job entry point.
//!
//! Reads the stored series and population tables, computes the results, and
//! prints the run summary as JSON.

use anyhow::Context;
use tracing::info;

use quest_jobs::{JobConfig, build_store, init_tracing, run_analytics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("quest-analytics starting");

    let config = JobConfig::load().context("loading configuration")?;
    let store = build_store(&config.storage).context("building object store")?;

    let summary = run_analytics(&config, store.as_ref())
        .await
        .context("analytics run failed")?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
