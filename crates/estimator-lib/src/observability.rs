//! Observability infrastructure for the cost estimator
//!
//! Provides:
//! - Prometheus metrics (workloads per class, diagnostics per kind, cluster cost)
//! - Structured JSON logging with tracing

use crate::aggregator::ClusterReport;
use crate::diagnostics::{Diagnostic, Severity};
use crate::error::Result;
use crate::models::Workload;
use prometheus::{
    Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use tracing::{debug, info, warn};

/// Histogram buckets for estimation runs (in seconds)
const DURATION_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// Estimator metrics for Prometheus exposition
///
/// Metrics live in a registry owned by the handle; clones share it.
#[derive(Clone)]
pub struct EstimatorMetrics {
    registry: Registry,
    workloads_priced: IntCounterVec,
    diagnostics: IntCounterVec,
    class_hourly_cost: GaugeVec,
    cluster_hourly_cost: Gauge,
    estimate_duration_seconds: Histogram,
}

impl EstimatorMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let workloads_priced = IntCounterVec::new(
            Opts::new(
                "cost_estimator_workloads_priced_total",
                "Workloads priced, by compute class",
            ),
            &["compute_class"],
        )?;
        let diagnostics = IntCounterVec::new(
            Opts::new(
                "cost_estimator_diagnostics_total",
                "Advisory findings raised while estimating, by kind",
            ),
            &["kind"],
        )?;
        let class_hourly_cost = GaugeVec::new(
            Opts::new(
                "cost_estimator_class_hourly_cost",
                "Hourly cost of the last estimate, by compute class",
            ),
            &["compute_class"],
        )?;
        let cluster_hourly_cost = Gauge::new(
            "cost_estimator_cluster_hourly_cost",
            "Total hourly cost of the last estimate, including the cluster fee",
        )?;
        let estimate_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "cost_estimator_estimate_duration_seconds",
                "Time spent estimating a cluster",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
        )?;

        registry.register(Box::new(workloads_priced.clone()))?;
        registry.register(Box::new(diagnostics.clone()))?;
        registry.register(Box::new(class_hourly_cost.clone()))?;
        registry.register(Box::new(cluster_hourly_cost.clone()))?;
        registry.register(Box::new(estimate_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            workloads_priced,
            diagnostics,
            class_hourly_cost,
            cluster_hourly_cost,
            estimate_duration_seconds,
        })
    }

    pub fn inc_workloads_priced(&self, workload: &Workload) {
        self.workloads_priced
            .with_label_values(&[workload.compute_class.as_str()])
            .inc();
    }

    pub fn inc_diagnostic(&self, diagnostic: &Diagnostic) {
        self.diagnostics.with_label_values(&[diagnostic.kind()]).inc();
    }

    pub fn observe_estimate_duration(&self, duration_secs: f64) {
        self.estimate_duration_seconds.observe(duration_secs);
    }

    /// Fold a finished report into the counters and gauges
    pub fn record_report(&self, report: &ClusterReport) {
        for workload in &report.workloads {
            self.inc_workloads_priced(workload);
        }
        for diagnostic in &report.diagnostics {
            self.inc_diagnostic(diagnostic);
        }

        self.class_hourly_cost.reset();
        for (class, cost) in report.class_costs() {
            self.class_hourly_cost
                .with_label_values(&[class.as_str()])
                .set(cost);
        }
        self.cluster_hourly_cost.set(report.summary.total_hourly);
    }

    /// Text exposition format of everything registered
    pub fn encode_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Structured logger for estimator events
///
/// Diagnostics returned by the core are turned into tracing events here.
#[derive(Clone)]
pub struct StructuredLogger {
    cluster: String,
}

impl StructuredLogger {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
        }
    }

    /// Log estimator startup
    pub fn log_startup(&self, version: &str, region: &str) {
        info!(
            event = "estimator_started",
            cluster = %self.cluster,
            estimator_version = %version,
            region = %region,
            "Cost estimator started"
        );
    }

    /// Log one diagnostic at the level its severity calls for
    pub fn log_diagnostic(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => warn!(
                event = "estimate_diagnostic",
                cluster = %self.cluster,
                kind = diagnostic.kind(),
                "{diagnostic}"
            ),
            Severity::Info => info!(
                event = "estimate_diagnostic",
                cluster = %self.cluster,
                kind = diagnostic.kind(),
                "{diagnostic}"
            ),
        }
    }

    /// Log a priced workload
    pub fn log_workload_priced(&self, workload: &Workload) {
        debug!(
            event = "workload_priced",
            cluster = %self.cluster,
            workload = %workload.name,
            namespace = %workload.namespace,
            node = %workload.node_name,
            compute_class = workload.compute_class.as_str(),
            cpu_milli = workload.resources.cpu_milli,
            memory_mebibytes = workload.resources.memory_mebibytes,
            storage_mebibytes = workload.resources.storage_mebibytes,
            gpu_count = workload.gpu_count,
            spot = workload.spot,
            hourly_cost = workload.hourly_cost,
            "Priced workload"
        );
    }

    /// Log the cluster totals of a report
    pub fn log_summary(&self, report: &ClusterReport) {
        let s = &report.summary;
        info!(
            event = "cluster_estimated",
            cluster = %self.cluster,
            region = %report.region,
            nodes = report.nodes.len(),
            workloads = report.workloads.len(),
            diagnostics = report.diagnostics.len(),
            on_demand_hourly = s.on_demand_hourly,
            spot_hourly = s.spot_hourly,
            cluster_fee = s.cluster_fee,
            total_hourly = s.total_hourly,
            one_year_commit_hourly = s.one_year_commit_hourly,
            three_year_commit_hourly = s.three_year_commit_hourly,
            "Cluster cost estimated"
        );
    }

    /// Log every workload, every diagnostic and the summary of a report
    pub fn log_report(&self, report: &ClusterReport) {
        for workload in &report.workloads {
            self.log_workload_priced(workload);
        }
        for diagnostic in &report.diagnostics {
            self.log_diagnostic(diagnostic);
        }
        self.log_summary(report);
    }
}
