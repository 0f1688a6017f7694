//! Keyed price lookups
//!
//! A missing entry is always a plain lookup miss; the engine decides what
//! a miss means for the cost being composed.

use crate::error::{EstimatorError, Result};
use crate::models::{ComputeClass, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Hourly base rates for one machine family
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineRate {
    /// Price per vCPU
    pub core: f64,
    /// Price per GiB of RAM
    pub ram: f64,
}

/// Pair of sub-tables split by pricing mode
#[derive(Debug, Clone, Default, PartialEq)]
struct BySpot<T> {
    on_demand: T,
    spot: T,
}

impl<T> BySpot<T> {
    fn get(&self, spot: bool) -> &T {
        if spot {
            &self.spot
        } else {
            &self.on_demand
        }
    }

    fn get_mut(&mut self, spot: bool) -> &mut T {
        if spot {
            &mut self.spot
        } else {
            &mut self.on_demand
        }
    }
}

/// Immutable price table for one region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    region: String,
    rates: BySpot<HashMap<(ComputeClass, ResourceKind), f64>>,
    machines: BySpot<HashMap<String, MachineRate>>,
    gpus: BySpot<HashMap<ComputeClass, HashMap<String, f64>>>,
}

impl PriceTable {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn with_rate(
        mut self,
        class: ComputeClass,
        spot: bool,
        resource: ResourceKind,
        rate: f64,
    ) -> Self {
        self.rates.get_mut(spot).insert((class, resource), rate);
        self
    }

    pub fn with_machine(
        mut self,
        family: impl Into<String>,
        spot: bool,
        core: f64,
        ram: f64,
    ) -> Self {
        self.machines
            .get_mut(spot)
            .insert(family.into(), MachineRate { core, ram });
        self
    }

    pub fn with_gpu(
        mut self,
        class: ComputeClass,
        spot: bool,
        model: impl Into<String>,
        rate: f64,
    ) -> Self {
        self.gpus
            .get_mut(spot)
            .entry(class)
            .or_default()
            .insert(model.into(), rate);
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Per-unit rate (per 1000 mCPU or per 1000 MiB)
    pub fn rate(&self, class: ComputeClass, spot: bool, resource: ResourceKind) -> Option<f64> {
        self.rates.get(spot).get(&(class, resource)).copied()
    }

    pub fn machine_rate(&self, family: &str, spot: bool) -> Option<MachineRate> {
        self.machines.get(spot).get(family).copied()
    }

    /// Per-GPU rate for `model` within a GPU-bearing class
    pub fn gpu_rate(&self, class: ComputeClass, spot: bool, model: &str) -> Option<f64> {
        self.gpus
            .get(spot)
            .get(&class)
            .and_then(|models| models.get(model))
            .copied()
    }

    /// Decode and validate a JSON price document
    pub fn from_json(contents: &str) -> Result<Self> {
        let document: PriceTableDocument = serde_json::from_str(contents)?;
        Self::try_from(document)
    }

    /// Read a JSON price document from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EstimatorError::io(path.display().to_string(), e))?;
        Self::from_json(&contents)
    }
}

/// Serialized form of a [`PriceTable`]: flat entry lists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTableDocument {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub rates: Vec<RateEntry>,
    #[serde(default)]
    pub machines: Vec<MachineEntry>,
    #[serde(default)]
    pub gpus: Vec<GpuEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateEntry {
    pub class: ComputeClass,
    #[serde(default)]
    pub spot: bool,
    pub resource: ResourceKind,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineEntry {
    pub family: String,
    #[serde(default)]
    pub spot: bool,
    pub core: f64,
    pub ram: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuEntry {
    pub class: ComputeClass,
    #[serde(default)]
    pub spot: bool,
    pub model: String,
    pub rate: f64,
}

fn validate(entry: impl FnOnce() -> String, rate: f64) -> Result<f64> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(rate)
    } else {
        Err(EstimatorError::InvalidPrice {
            entry: entry(),
            rate,
        })
    }
}

impl TryFrom<PriceTableDocument> for PriceTable {
    type Error = EstimatorError;

    fn try_from(document: PriceTableDocument) -> Result<Self> {
        let mut table = PriceTable::new(document.region);

        for e in document.rates {
            let rate = validate(
                || format!("{} {:?} (spot={})", e.class.as_str(), e.resource, e.spot),
                e.rate,
            )?;
            table = table.with_rate(e.class, e.spot, e.resource, rate);
        }

        for e in document.machines {
            let core = validate(|| format!("{} core (spot={})", e.family, e.spot), e.core)?;
            let ram = validate(|| format!("{} ram (spot={})", e.family, e.spot), e.ram)?;
            table = table.with_machine(e.family, e.spot, core, ram);
        }

        for e in document.gpus {
            let rate = validate(
                || format!("{} {} (spot={})", e.class.as_str(), e.model, e.spot),
                e.rate,
            )?;
            table = table.with_gpu(e.class, e.spot, e.model, rate);
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "region": "us-central1",
        "rates": [
            {"class": "general-purpose", "resource": "cpu", "rate": 0.0573},
            {"class": "general-purpose", "spot": true, "resource": "cpu", "rate": 0.0172}
        ],
        "machines": [
            {"family": "c2", "core": 0.03398, "ram": 0.00455}
        ],
        "gpus": [
            {"class": "gpu-pod", "model": "nvidia-l4", "rate": 0.6783}
        ]
    }"#;

    #[test]
    fn test_document_lookups() {
        let table = PriceTable::from_json(DOCUMENT).unwrap();
        assert_eq!(table.region(), "us-central1");
        assert_eq!(
            table.rate(ComputeClass::GeneralPurpose, false, ResourceKind::Cpu),
            Some(0.0573)
        );
        assert_eq!(
            table.rate(ComputeClass::GeneralPurpose, true, ResourceKind::Cpu),
            Some(0.0172)
        );
        assert_eq!(
            table.rate(ComputeClass::GeneralPurpose, false, ResourceKind::Memory),
            None
        );
        assert_eq!(
            table.machine_rate("c2", false),
            Some(MachineRate {
                core: 0.03398,
                ram: 0.00455
            })
        );
        assert_eq!(table.machine_rate("c2", true), None);
        assert_eq!(
            table.gpu_rate(ComputeClass::GpuPod, false, "nvidia-l4"),
            Some(0.6783)
        );
        assert_eq!(
            table.gpu_rate(ComputeClass::Accelerator, false, "nvidia-l4"),
            None
        );
    }

    #[test]
    fn test_negative_rate_rejected() {
        let doc = r#"{"rates": [{"class": "balanced", "resource": "memory", "rate": -1.0}]}"#;
        let err = PriceTable::from_json(doc).unwrap_err();
        assert!(matches!(err, EstimatorError::InvalidPrice { .. }));
    }

    #[test]
    fn test_unknown_class_rejected() {
        let doc = r#"{"rates": [{"class": "turbo", "resource": "cpu", "rate": 1.0}]}"#;
        assert!(matches!(
            PriceTable::from_json(doc),
            Err(EstimatorError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("prices.json");
        tokio::fs::write(&path, DOCUMENT).await.unwrap();

        let table = PriceTable::load(&path).await.unwrap();
        assert_eq!(table.region(), "us-central1");

        let missing = PriceTable::load(&dir.path().join("absent.json")).await;
        assert!(matches!(missing, Err(EstimatorError::Io { .. })));
    }
}
