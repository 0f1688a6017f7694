//! Core data models for the cost estimator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EstimatorError;

/// Compute class a workload is billed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComputeClass {
    GeneralPurpose,
    Balanced,
    #[serde(rename = "scale-out")]
    Scaleout,
    #[serde(rename = "scale-out-arm")]
    ScaleoutArm,
    Performance,
    Accelerator,
    GpuPod,
}

impl ComputeClass {
    pub const ALL: [ComputeClass; 7] = [
        ComputeClass::GeneralPurpose,
        ComputeClass::Balanced,
        ComputeClass::Scaleout,
        ComputeClass::ScaleoutArm,
        ComputeClass::Performance,
        ComputeClass::Accelerator,
        ComputeClass::GpuPod,
    ];

    /// Stable identifier used in documents, metrics labels and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeClass::GeneralPurpose => "general-purpose",
            ComputeClass::Balanced => "balanced",
            ComputeClass::Scaleout => "scale-out",
            ComputeClass::ScaleoutArm => "scale-out-arm",
            ComputeClass::Performance => "performance",
            ComputeClass::Accelerator => "accelerator",
            ComputeClass::GpuPod => "gpu-pod",
        }
    }
}

impl fmt::Display for ComputeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComputeClass::GeneralPurpose => "General-purpose",
            ComputeClass::Balanced => "Balanced",
            ComputeClass::Scaleout => "Scale-out",
            ComputeClass::ScaleoutArm => "Scale-out arm64",
            ComputeClass::Performance => "Performance",
            ComputeClass::Accelerator => "Accelerator",
            ComputeClass::GpuPod => "GPU Pod",
        };
        f.write_str(label)
    }
}

impl FromStr for ComputeClass {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComputeClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| EstimatorError::UnknownComputeClass(s.to_string()))
    }
}

/// Billable resource dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Storage,
}

/// A workload's footprint in billing units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceTriple {
    pub cpu_milli: u64,
    pub memory_mebibytes: u64,
    pub storage_mebibytes: u64,
}

impl ResourceTriple {
    pub fn new(cpu_milli: u64, memory_mebibytes: u64, storage_mebibytes: u64) -> Self {
        Self {
            cpu_milli,
            memory_mebibytes,
            storage_mebibytes,
        }
    }
}

/// Raw resource amounts as observed or requested, before normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceAmounts {
    pub cpu_milli: u64,
    pub memory_mebibytes: u64,
    pub storage_mebibytes: u64,
}

impl ResourceAmounts {
    /// Per-dimension maximum; a request acts as a floor on billable usage
    pub fn max(self, other: ResourceAmounts) -> ResourceAmounts {
        ResourceAmounts {
            cpu_milli: self.cpu_milli.max(other.cpu_milli),
            memory_mebibytes: self.memory_mebibytes.max(other.memory_mebibytes),
            storage_mebibytes: self.storage_mebibytes.max(other.storage_mebibytes),
        }
    }

    pub fn saturating_add(self, other: ResourceAmounts) -> ResourceAmounts {
        ResourceAmounts {
            cpu_milli: self.cpu_milli.saturating_add(other.cpu_milli),
            memory_mebibytes: self.memory_mebibytes.saturating_add(other.memory_mebibytes),
            storage_mebibytes: self.storage_mebibytes.saturating_add(other.storage_mebibytes),
        }
    }
}

/// Usage sample and request declaration for one container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerUsage {
    pub name: String,
    #[serde(default)]
    pub usage: ResourceAmounts,
    #[serde(default)]
    pub requests: ResourceAmounts,
    /// Requested `nvidia.com/gpu` count
    #[serde(default)]
    pub gpu_requests: u32,
}

/// A pod with its per-container usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodUsage {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub node_name: String,
    /// Value of the accelerator node selector, if any
    #[serde(default)]
    pub gpu_model: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerUsage>,
}

fn default_namespace() -> String {
    "default".to_string()
}

/// Node metadata relevant to pricing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub instance_type: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub spot: bool,
}

/// Point-in-time view of a cluster handed over by a usage source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub nodes: Vec<NodeInfo>,
    #[serde(default)]
    pub pods: Vec<PodUsage>,
}

/// Priced workload record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub name: String,
    pub namespace: String,
    pub node_name: String,
    pub container_count: usize,
    pub resources: ResourceTriple,
    pub gpu_model: Option<String>,
    pub gpu_count: u32,
    pub compute_class: ComputeClass,
    pub spot: bool,
    pub hourly_cost: f64,
}

/// Running cost total for one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCost {
    pub name: String,
    pub instance_type: String,
    pub region: String,
    pub spot: bool,
    pub hourly_cost: f64,
    pub workloads: Vec<Workload>,
}

impl NodeCost {
    pub fn from_node(node: &NodeInfo) -> Self {
        Self {
            name: node.name.clone(),
            instance_type: node.instance_type.clone(),
            region: node.region.clone(),
            spot: node.spot,
            hourly_cost: 0.0,
            workloads: Vec::new(),
        }
    }
}
