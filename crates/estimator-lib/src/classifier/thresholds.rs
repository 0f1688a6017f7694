//! Numeric bands and machine-family hints that drive classification
//!
//! Every field defaults to zero or empty when absent from configuration.
//! A zero ceiling admits nothing, so such a class is never selected by the
//! ratio path and workloads end up on the general-purpose fallback.

use serde::Deserialize;
use std::collections::HashMap;

/// Inclusive memory:cpu ratio band
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RatioBand {
    pub min: f64,
    pub max: f64,
}

impl RatioBand {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, ratio: f64) -> bool {
        ratio >= self.min && ratio <= self.max
    }
}

/// Absolute upper bounds for a class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Ceiling {
    pub mcpu_max: u64,
    pub memory_max: u64,
}

impl Ceiling {
    pub fn new(mcpu_max: u64, memory_max: u64) -> Self {
        Self {
            mcpu_max,
            memory_max,
        }
    }

    pub fn admits(&self, cpu_milli: u64, memory_mebibytes: u64) -> bool {
        cpu_milli <= self.mcpu_max && memory_mebibytes <= self.memory_max
    }
}

/// Accepted mCPU and memory range for one GPU model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GpuBand {
    pub mcpu_min: u64,
    pub mcpu_max: u64,
    pub memory_min: u64,
    pub memory_max: u64,
}

impl GpuBand {
    pub fn admits(&self, cpu_milli: u64, memory_mebibytes: u64) -> bool {
        (self.mcpu_min..=self.mcpu_max).contains(&cpu_milli)
            && (self.memory_min..=self.memory_max).contains(&memory_mebibytes)
    }
}

/// Ratio bands per ratio-classified class
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RatioBands {
    pub general_purpose: RatioBand,
    pub balanced: RatioBand,
    pub scaleout: RatioBand,
    pub performance: RatioBand,
}

/// Ceilings per class
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub general_purpose: Ceiling,
    pub balanced: Ceiling,
    pub scaleout: Ceiling,
    pub scaleout_arm: Ceiling,
    pub performance: Ceiling,
}

/// Lower bounds shared by all accelerator workloads, plus ceilings for
/// models that are only offered on accelerator machines
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AcceleratorLimits {
    pub mcpu_min: u64,
    pub memory_min: u64,
    pub models: HashMap<String, Ceiling>,
}

/// Machine-type hints
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MachineFamilies {
    pub compute_optimized_prefixes: Vec<String>,
    pub accelerator_optimized_prefixes: Vec<String>,
    pub arm64_prefix: String,
    /// GPU model only served by the performance class
    pub flagship_gpu: String,
}

impl MachineFamilies {
    pub fn is_compute_optimized(&self, machine_type: &str) -> bool {
        matches_any_prefix(machine_type, &self.compute_optimized_prefixes)
    }

    pub fn is_accelerator_optimized(&self, machine_type: &str) -> bool {
        matches_any_prefix(machine_type, &self.accelerator_optimized_prefixes)
    }

    pub fn is_arm64(&self, machine_type: &str) -> bool {
        !self.arm64_prefix.is_empty() && machine_type.starts_with(self.arm64_prefix.as_str())
    }

    pub fn is_flagship_gpu(&self, gpu_model: Option<&str>) -> bool {
        match gpu_model {
            Some(model) => !self.flagship_gpu.is_empty() && model == self.flagship_gpu,
            None => false,
        }
    }
}

fn matches_any_prefix(machine_type: &str, prefixes: &[String]) -> bool {
    prefixes
        .iter()
        .filter(|prefix| !prefix.is_empty())
        .any(|prefix| machine_type.starts_with(prefix.as_str()))
}

/// Full classification configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    pub machines: MachineFamilies,
    pub ratios: RatioBands,
    pub limits: Limits,
    pub gpu_pod: HashMap<String, GpuBand>,
    pub accelerator: AcceleratorLimits,
}

impl ClassificationThresholds {
    /// Accepted range for `model` on an accelerator machine. Models without
    /// a dedicated accelerator ceiling borrow the GPU pod maximums.
    pub fn accelerator_band(&self, model: &str) -> Option<GpuBand> {
        let ceiling = self
            .accelerator
            .models
            .get(model)
            .copied()
            .or_else(|| {
                self.gpu_pod
                    .get(model)
                    .map(|band| Ceiling::new(band.mcpu_max, band.memory_max))
            })?;

        Some(GpuBand {
            mcpu_min: self.accelerator.mcpu_min,
            mcpu_max: ceiling.mcpu_max,
            memory_min: self.accelerator.memory_min,
            memory_max: ceiling.memory_max,
        })
    }
}
