//! Run configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Where the estimator reads its inputs and writes its outputs
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// JSON price table document
    #[serde(default = "default_price_table_path")]
    pub price_table_path: PathBuf,

    /// JSON cluster usage snapshot
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// TOML overrides for the built-in estimator configuration
    #[serde(default)]
    pub config_path: Option<PathBuf>,

    /// Report destination; stdout when unset
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Prometheus text file destination
    #[serde(default)]
    pub metrics_path: Option<PathBuf>,

    /// Price pods on separate tasks
    #[serde(default)]
    pub concurrent: bool,
}

fn default_price_table_path() -> PathBuf {
    PathBuf::from("prices.json")
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("snapshot.json")
}

impl RunConfig {
    /// Load configuration from `COST_ESTIMATOR_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("COST_ESTIMATOR").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
