//! Cluster-level totals and the exported report

use crate::config::BillingConfig;
use crate::diagnostics::Diagnostic;
use crate::models::{ComputeClass, NodeCost, Workload};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Hourly cost totals for a cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub on_demand_hourly: f64,
    pub spot_hourly: f64,
    pub cluster_fee: f64,
    pub total_hourly: f64,
    pub one_year_commit_hourly: f64,
    pub three_year_commit_hourly: f64,
}

impl ClusterSummary {
    /// Commitment discounts apply to on-demand capacity only
    pub fn new(on_demand_hourly: f64, spot_hourly: f64, billing: &BillingConfig) -> Self {
        let fee = billing.cluster_fee;
        Self {
            on_demand_hourly,
            spot_hourly,
            cluster_fee: fee,
            total_hourly: on_demand_hourly + spot_hourly + fee,
            one_year_commit_hourly: spot_hourly
                + on_demand_hourly * billing.one_year_commit_discount
                + fee,
            three_year_commit_hourly: spot_hourly
                + on_demand_hourly * billing.three_year_commit_discount
                + fee,
        }
    }

    /// Totals over settled node records, split by each node's pricing mode
    pub fn from_nodes(nodes: &[NodeCost], billing: &BillingConfig) -> Self {
        let (spot, on_demand): (Vec<&NodeCost>, Vec<&NodeCost>) =
            nodes.iter().partition(|node| node.spot);
        Self::new(
            on_demand.iter().map(|n| n.hourly_cost).sum(),
            spot.iter().map(|n| n.hourly_cost).sum(),
            billing,
        )
    }
}

/// Priced view of a whole cluster, ready for JSON export
#[derive(Debug, Clone, Serialize)]
pub struct ClusterReport {
    pub cluster: String,
    pub region: String,
    pub generated_at: DateTime<Utc>,
    pub nodes: Vec<NodeCost>,
    pub workloads: Vec<Workload>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: ClusterSummary,
}

impl ClusterReport {
    /// Number of workloads per compute class
    pub fn class_counts(&self) -> BTreeMap<ComputeClass, usize> {
        let mut counts = BTreeMap::new();
        for workload in &self.workloads {
            *counts.entry(workload.compute_class).or_insert(0) += 1;
        }
        counts
    }

    /// Hourly cost per compute class, over all priced workloads
    pub fn class_costs(&self) -> BTreeMap<ComputeClass, f64> {
        let mut costs = BTreeMap::new();
        for workload in &self.workloads {
            *costs.entry(workload.compute_class).or_insert(0.0) += workload.hourly_cost;
        }
        costs
    }
}
