//! Compute-class selection
//!
//! Selection is ordered: machine family and GPU signals always dominate the
//! ratio-based classes. Range checks on the GPU, accelerator and arm64 paths
//! are advisory and never change the returned class.

mod thresholds;

#[cfg(test)]
mod tests;

pub use thresholds::{
    AcceleratorLimits, Ceiling, ClassificationThresholds, GpuBand, Limits, MachineFamilies,
    RatioBand, RatioBands,
};

use crate::diagnostics::Diagnostic;
use crate::models::ComputeClass;

/// Everything the classifier looks at for one workload
#[derive(Debug, Clone, Copy)]
pub struct WorkloadShape<'a> {
    pub workload: &'a str,
    pub machine_type: &'a str,
    pub cpu_milli: u64,
    pub memory_mebibytes: u64,
    pub gpu_count: u32,
    pub gpu_model: Option<&'a str>,
    pub arm64: bool,
}

impl WorkloadShape<'_> {
    /// Memory:cpu ratio rounded up
    pub fn ratio(&self) -> f64 {
        (self.memory_mebibytes as f64 / self.cpu_milli.max(1) as f64).ceil()
    }
}

/// Selected class plus any advisory findings
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub class: ComputeClass,
    pub diagnostics: Vec<Diagnostic>,
}

impl Classification {
    fn clean(class: ComputeClass) -> Self {
        Self {
            class,
            diagnostics: Vec::new(),
        }
    }
}

/// Maps workload shapes to compute classes
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    thresholds: &'a ClassificationThresholds,
}

impl<'a> Classifier<'a> {
    pub fn new(thresholds: &'a ClassificationThresholds) -> Self {
        Self { thresholds }
    }

    /// Pick the compute class for a workload. Always returns a class.
    pub fn decide_class(&self, shape: &WorkloadShape<'_>) -> Classification {
        let t = self.thresholds;
        let ratio = shape.ratio();
        let (cpu, memory) = (shape.cpu_milli, shape.memory_mebibytes);

        if t.machines.is_compute_optimized(shape.machine_type) {
            return Classification::clean(ComputeClass::Performance);
        }

        if t.machines.is_flagship_gpu(shape.gpu_model) {
            let in_range = t.ratios.performance.contains(ratio)
                && t.limits.performance.admits(cpu, memory);
            return self.checked(ComputeClass::Performance, shape, in_range);
        }

        if t.machines.is_accelerator_optimized(shape.machine_type) {
            let in_range = shape
                .gpu_model
                .and_then(|model| t.accelerator_band(model))
                .map_or(true, |band| band.admits(cpu, memory));
            return self.checked(ComputeClass::Accelerator, shape, in_range);
        }

        if shape.gpu_count > 0 {
            let in_range = shape
                .gpu_model
                .and_then(|model| t.gpu_pod.get(model))
                .map_or(true, |band| band.admits(cpu, memory));
            return self.checked(ComputeClass::GpuPod, shape, in_range);
        }

        if shape.arm64 {
            let in_range =
                t.ratios.scaleout.contains(ratio) && t.limits.scaleout_arm.admits(cpu, memory);
            return self.checked(ComputeClass::ScaleoutArm, shape, in_range);
        }

        let candidates = [
            (
                ComputeClass::GeneralPurpose,
                &t.ratios.general_purpose,
                &t.limits.general_purpose,
            ),
            (ComputeClass::Scaleout, &t.ratios.scaleout, &t.limits.scaleout),
            (ComputeClass::Balanced, &t.ratios.balanced, &t.limits.balanced),
        ];

        for (class, band, ceiling) in candidates {
            if band.contains(ratio) && ceiling.admits(cpu, memory) {
                return Classification::clean(class);
            }
        }

        Classification {
            class: ComputeClass::GeneralPurpose,
            diagnostics: vec![Diagnostic::NoMatchingClass {
                workload: shape.workload.to_string(),
            }],
        }
    }

    fn checked(
        &self,
        class: ComputeClass,
        shape: &WorkloadShape<'_>,
        in_range: bool,
    ) -> Classification {
        let mut classification = Classification::clean(class);
        if !in_range {
            classification.diagnostics.push(Diagnostic::OutOfRange {
                workload: shape.workload.to_string(),
                class,
                gpu_model: shape.gpu_model.map(str::to_string),
                cpu_milli: shape.cpu_milli,
                memory_mebibytes: shape.memory_mebibytes,
            });
        }
        classification
    }
}
