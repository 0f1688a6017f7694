//! Cost estimation for Kubernetes workloads under classed pricing
//!
//! This crate provides:
//! - Resource normalization to billable increments
//! - Compute-class classification from configurable thresholds
//! - Tiered hourly pricing from a regional price table
//! - Per-node and cluster-level aggregation
//! - Configuration loading and observability

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod observability;
pub mod pricing;

pub use aggregator::{
    ClusterReport, ClusterSummary, Estimate, Estimator, NodeLedger, SnapshotSource, UsageSource,
};
pub use classifier::{Classification, ClassificationThresholds, Classifier, WorkloadShape};
pub use config::{BillingConfig, EstimatorConfig};
pub use diagnostics::{Diagnostic, Severity};
pub use error::{EstimatorError, Result};
pub use models::*;
pub use normalizer::{Normalizer, NormalizerPolicy};
pub use observability::{EstimatorMetrics, StructuredLogger};
pub use pricing::{PriceQuote, PriceTable, PricingEngine, PricingRequest};
