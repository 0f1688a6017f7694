//! Error types for the estimator's I/O-facing seams
//!
//! The normalizer, classifier and pricing engine never fail; these errors
//! only come from loading configuration, price tables and usage snapshots.

use thiserror::Error;

/// Result type for estimator operations
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Errors raised while preparing inputs for the estimator
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// Configuration could not be built or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Reading an input file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An input document is not valid JSON for its schema
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// A price entry is negative or not a finite number
    #[error("Invalid price for {entry}: {rate}")]
    InvalidPrice { entry: String, rate: f64 },

    /// A compute class name is not one of the known classes
    #[error("Unknown compute class: {0}")]
    UnknownComputeClass(String),

    /// Metric registration or encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl EstimatorError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        EstimatorError::Io {
            path: path.into(),
            source,
        }
    }
}
