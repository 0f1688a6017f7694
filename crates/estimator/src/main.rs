//! Cost Estimator - prices a cluster usage snapshot
//!
//! Reads a price table and a usage snapshot, classifies and prices every
//! workload, and writes the cluster report as JSON.

use anyhow::{Context, Result};
use estimator_lib::{
    observability::{EstimatorMetrics, StructuredLogger},
    EstimatorConfig, Estimator, PriceTable, SnapshotSource, UsageSource,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

const ESTIMATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs go to stderr; stdout may carry the report
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let run = config::RunConfig::load().context("Failed to read run configuration")?;
    info!(
        price_table = %run.price_table_path.display(),
        snapshot = %run.snapshot_path.display(),
        concurrent = run.concurrent,
        "Estimator configured"
    );

    let estimator_config = EstimatorConfig::load(run.config_path.as_deref())
        .context("Failed to load estimator configuration")?;
    let prices = PriceTable::load(&run.price_table_path)
        .await
        .with_context(|| format!("Failed to load price table {}", run.price_table_path.display()))?;

    let source = SnapshotSource::new(
        &run.snapshot_path,
        estimator_config.excluded_namespaces.clone(),
    );
    let cluster = source
        .cluster()
        .await
        .with_context(|| format!("Failed to load snapshot {}", run.snapshot_path.display()))?;

    let logger = StructuredLogger::new(&cluster);
    logger.log_startup(ESTIMATOR_VERSION, prices.region());

    let metrics = EstimatorMetrics::new()?;
    let estimator = Arc::new(Estimator::new(Arc::new(estimator_config), Arc::new(prices)));

    let started = Instant::now();
    let report = estimator.estimate_source(&source, run.concurrent).await?;
    metrics.observe_estimate_duration(started.elapsed().as_secs_f64());

    logger.log_report(&report);
    metrics.record_report(&report);

    let json = serde_json::to_string_pretty(&report)?;
    match &run.output_path {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }

    if let Some(path) = &run.metrics_path {
        tokio::fs::write(path, metrics.encode_text()?)
            .await
            .with_context(|| format!("Failed to write metrics {}", path.display()))?;
        info!(path = %path.display(), "Metrics written");
    }

    Ok(())
}
