//! Per-node cost accumulation

use crate::models::{NodeCost, NodeInfo, Workload};
use dashmap::DashMap;
use tracing::debug;

/// Running cost totals keyed by node name
///
/// Updates to a node go through its map shard lock, so pricing tasks may
/// record concurrently.
#[derive(Debug, Default)]
pub struct NodeLedger {
    nodes: DashMap<String, NodeCost>,
}

impl NodeLedger {
    /// Ledger with an empty entry for every known node
    pub fn new(nodes: &[NodeInfo]) -> Self {
        let ledger = Self::default();
        for node in nodes {
            ledger
                .nodes
                .insert(node.name.clone(), NodeCost::from_node(node));
        }
        ledger
    }

    /// Add a priced workload to its node. Returns `false` when the node is
    /// not tracked; the workload is then left out.
    pub fn record(&self, workload: &Workload) -> bool {
        match self.nodes.get_mut(&workload.node_name) {
            Some(mut entry) => {
                entry.hourly_cost += workload.hourly_cost;
                entry.workloads.push(workload.clone());
                debug!(
                    node = %workload.node_name,
                    workload = %workload.name,
                    node_hourly_cost = entry.hourly_cost,
                    "Recorded workload cost"
                );
                true
            }
            None => false,
        }
    }

    /// Current running total for a node
    pub fn node_cost(&self, name: &str) -> Option<f64> {
        self.nodes.get(name).map(|entry| entry.hourly_cost)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Settled node records, sorted by node name with workloads sorted by
    /// namespace and name. Totals are re-summed in that order so they do not
    /// depend on the order workloads were recorded in.
    pub fn nodes(&self) -> Vec<NodeCost> {
        let mut nodes: Vec<NodeCost> = self.nodes.iter().map(|r| r.value().clone()).collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));

        for node in &mut nodes {
            node.workloads.sort_by(|a, b| {
                a.namespace
                    .cmp(&b.namespace)
                    .then_with(|| a.name.cmp(&b.name))
            });
            node.hourly_cost = node.workloads.iter().map(|w| w.hourly_cost).sum();
        }

        nodes
    }
}
