//! Usage sources feeding the aggregator

use crate::error::{EstimatorError, Result};
use crate::models::{ClusterSnapshot, NodeInfo, PodUsage};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Supplier of node metadata and per-pod usage
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Name of the cluster the data belongs to
    async fn cluster(&self) -> Result<String>;

    /// Nodes of the cluster
    async fn nodes(&self) -> Result<Vec<NodeInfo>>;

    /// Pods to be estimated
    async fn pods(&self) -> Result<Vec<PodUsage>>;

    /// Gather everything into one snapshot
    async fn snapshot(&self) -> Result<ClusterSnapshot> {
        Ok(ClusterSnapshot {
            cluster: self.cluster().await?,
            nodes: self.nodes().await?,
            pods: self.pods().await?,
        })
    }
}

/// Reads a [`ClusterSnapshot`] JSON document from disk
///
/// The file is read once, on first access. Pods in excluded namespaces are
/// never returned.
pub struct SnapshotSource {
    path: PathBuf,
    excluded_namespaces: Vec<String>,
    snapshot: OnceCell<ClusterSnapshot>,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>, excluded_namespaces: Vec<String>) -> Self {
        Self {
            path: path.into(),
            excluded_namespaces,
            snapshot: OnceCell::new(),
        }
    }

    async fn load(&self) -> Result<&ClusterSnapshot> {
        self.snapshot
            .get_or_try_init(|| async {
                let contents = tokio::fs::read_to_string(&self.path)
                    .await
                    .map_err(|e| EstimatorError::io(self.path.display().to_string(), e))?;
                let snapshot: ClusterSnapshot = serde_json::from_str(&contents)?;
                info!(
                    path = %self.path.display(),
                    cluster = %snapshot.cluster,
                    nodes = snapshot.nodes.len(),
                    pods = snapshot.pods.len(),
                    "Loaded usage snapshot"
                );
                Ok::<_, EstimatorError>(snapshot)
            })
            .await
    }

    fn is_excluded(&self, namespace: &str) -> bool {
        self.excluded_namespaces.iter().any(|ns| ns == namespace)
    }
}

#[async_trait]
impl UsageSource for SnapshotSource {
    async fn cluster(&self) -> Result<String> {
        Ok(self.load().await?.cluster.clone())
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>> {
        Ok(self.load().await?.nodes.clone())
    }

    async fn pods(&self) -> Result<Vec<PodUsage>> {
        let snapshot = self.load().await?;
        let pods: Vec<PodUsage> = snapshot
            .pods
            .iter()
            .filter(|pod| !self.is_excluded(&pod.namespace))
            .cloned()
            .collect();
        debug!(
            kept = pods.len(),
            skipped = snapshot.pods.len() - pods.len(),
            "Filtered excluded namespaces"
        );
        Ok(pods)
    }
}
