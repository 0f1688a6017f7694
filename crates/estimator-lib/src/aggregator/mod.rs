//! Workload aggregation
//!
//! Ties the normalizer, classifier and pricing engine to cluster data: each
//! pod's containers are summed into one billable footprint, priced, and
//! accumulated into its node's running total.

mod ledger;
mod source;
mod summary;


pub use ledger::NodeLedger;
pub use source::{SnapshotSource, UsageSource};
pub use summary::{ClusterReport, ClusterSummary};

use crate::classifier::{Classifier, WorkloadShape};
use crate::config::EstimatorConfig;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::models::{ClusterSnapshot, NodeInfo, PodUsage, ResourceAmounts, Workload};
use crate::normalizer::Normalizer;
use crate::pricing::{PriceTable, PricingEngine, PricingRequest};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// A priced workload with everything noticed while pricing it
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub workload: Workload,
    pub diagnostics: Vec<Diagnostic>,
}

/// Composition root over an immutable configuration and price table
#[derive(Debug, Clone)]
pub struct Estimator {
    config: Arc<EstimatorConfig>,
    prices: Arc<PriceTable>,
    normalizer: Normalizer,
}

impl Estimator {
    pub fn new(config: Arc<EstimatorConfig>, prices: Arc<PriceTable>) -> Self {
        let normalizer = Normalizer::new(config.normalizer);
        Self {
            config,
            prices,
            normalizer,
        }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Price one pod. `node` is `None` when the pod's node is not known; the
    /// pod is then priced on-demand without a machine type.
    pub fn estimate_pod(&self, pod: &PodUsage, node: Option<&NodeInfo>) -> Estimate {
        let mut diagnostics = Vec::new();

        // Requests act as a floor on billable usage
        let amounts = pod
            .containers
            .iter()
            .fold(ResourceAmounts::default(), |total, c| {
                total.saturating_add(c.usage.max(c.requests))
            });
        let gpu_count = pod
            .containers
            .iter()
            .fold(0u32, |total, c| total.saturating_add(c.gpu_requests));

        let resources = self.normalizer.normalize(
            amounts.cpu_milli,
            amounts.memory_mebibytes,
            amounts.storage_mebibytes,
        );

        if node.is_none() {
            diagnostics.push(Diagnostic::UnknownNode {
                workload: pod.name.clone(),
                node: pod.node_name.clone(),
            });
        }
        let machine_type = node.map_or("", |n| n.instance_type.as_str());
        let spot = node.is_some_and(|n| n.spot);
        let thresholds = &self.config.classification;

        let classification = Classifier::new(thresholds).decide_class(&WorkloadShape {
            workload: &pod.name,
            machine_type,
            cpu_milli: resources.cpu_milli,
            memory_mebibytes: resources.memory_mebibytes,
            gpu_count,
            gpu_model: pod.gpu_model.as_deref(),
            arm64: thresholds.machines.is_arm64(machine_type),
        });
        diagnostics.extend(classification.diagnostics);

        let quote = PricingEngine::new(&self.prices).price(&PricingRequest {
            resources,
            gpu_count,
            gpu_model: pod.gpu_model.as_deref(),
            class: classification.class,
            machine_type,
            spot,
        });
        diagnostics.extend(quote.diagnostics);

        Estimate {
            workload: Workload {
                name: pod.name.clone(),
                namespace: pod.namespace.clone(),
                node_name: pod.node_name.clone(),
                container_count: pod.containers.len(),
                resources,
                gpu_model: pod.gpu_model.clone(),
                gpu_count,
                compute_class: classification.class,
                spot,
                hourly_cost: quote.hourly_cost,
            },
            diagnostics,
        }
    }

    /// Price every pod of a snapshot, one after another
    pub fn estimate_cluster(&self, snapshot: &ClusterSnapshot) -> ClusterReport {
        let ledger = NodeLedger::new(&snapshot.nodes);
        let nodes = index_nodes(&snapshot.nodes);

        let estimates = snapshot
            .pods
            .iter()
            .filter(|pod| !self.config.is_excluded(&pod.namespace))
            .map(|pod| {
                let estimate = self.estimate_pod(pod, nodes.get(pod.node_name.as_str()).copied());
                ledger.record(&estimate.workload);
                estimate
            })
            .collect();

        self.report(snapshot.cluster.clone(), &ledger, estimates)
    }

    /// Price every pod of a snapshot on its own task. Produces the same
    /// report as [`Estimator::estimate_cluster`].
    pub async fn estimate_cluster_concurrent(
        self: Arc<Self>,
        snapshot: ClusterSnapshot,
    ) -> ClusterReport {
        let ledger = Arc::new(NodeLedger::new(&snapshot.nodes));
        let nodes: HashMap<String, NodeInfo> = snapshot
            .nodes
            .iter()
            .map(|n| (n.name.clone(), n.clone()))
            .collect();

        let mut tasks = JoinSet::new();
        for (index, pod) in snapshot.pods.into_iter().enumerate() {
            if self.config.is_excluded(&pod.namespace) {
                continue;
            }
            let estimator = Arc::clone(&self);
            let ledger = Arc::clone(&ledger);
            let node = nodes.get(&pod.node_name).cloned();

            tasks.spawn(async move {
                let estimate = estimator.estimate_pod(&pod, node.as_ref());
                ledger.record(&estimate.workload);
                (index, estimate)
            });
        }

        let mut indexed = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => indexed.push(result),
                Err(e) => warn!(error = %e, "Pricing task failed"),
            }
        }
        indexed.sort_by_key(|(index, _)| *index);

        let estimates = indexed.into_iter().map(|(_, estimate)| estimate).collect();
        self.report(snapshot.cluster, &ledger, estimates)
    }

    /// Pull a snapshot from `source` and price it
    pub async fn estimate_source(
        self: Arc<Self>,
        source: &dyn UsageSource,
        concurrent: bool,
    ) -> Result<ClusterReport> {
        let snapshot = source.snapshot().await?;
        info!(
            cluster = %snapshot.cluster,
            nodes = snapshot.nodes.len(),
            pods = snapshot.pods.len(),
            concurrent = concurrent,
            "Estimating cluster"
        );

        if concurrent {
            Ok(self.estimate_cluster_concurrent(snapshot).await)
        } else {
            Ok(self.estimate_cluster(&snapshot))
        }
    }

    fn report(
        &self,
        cluster: String,
        ledger: &NodeLedger,
        estimates: Vec<Estimate>,
    ) -> ClusterReport {
        let nodes = ledger.nodes();
        let summary = ClusterSummary::from_nodes(&nodes, &self.config.billing);

        let mut workloads = Vec::with_capacity(estimates.len());
        let mut diagnostics = Vec::new();
        for estimate in estimates {
            workloads.push(estimate.workload);
            diagnostics.extend(estimate.diagnostics);
        }

        ClusterReport {
            cluster,
            region: self.prices.region().to_string(),
            generated_at: Utc::now(),
            nodes,
            workloads,
            diagnostics,
            summary,
        }
    }
}

fn index_nodes(nodes: &[NodeInfo]) -> HashMap<&str, &NodeInfo> {
    nodes.iter().map(|n| (n.name.as_str(), n)).collect()
}
