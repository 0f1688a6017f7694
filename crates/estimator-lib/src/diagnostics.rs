//! Advisory findings produced alongside classification and pricing results
//!
//! The core functions stay free of logging; callers decide where these go.

use crate::models::ComputeClass;
use serde::Serialize;
use std::fmt;

/// How loudly a diagnostic should be surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// A non-fatal finding about one workload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Requested resources fall outside the band of the class that was assigned
    OutOfRange {
        workload: String,
        class: ComputeClass,
        gpu_model: Option<String>,
        cpu_milli: u64,
        memory_mebibytes: u64,
    },
    /// No ratio band matched; the workload was defaulted to general-purpose
    NoMatchingClass { workload: String },
    /// No per-GPU rate exists for this model in the class/spot sub-table
    UnknownGpuModel {
        class: ComputeClass,
        model: String,
        spot: bool,
    },
    /// Machine family has no base rate
    UnknownMachineFamily { machine_type: String, spot: bool },
    /// Machine type does not follow `<family>-<class>-<cores>`
    MalformedMachineType { machine_type: String },
    /// Spot base rate missing for the family; on-demand rate used instead
    SpotFallback { family: String },
    /// Class premium evaluated to zero
    PriceUnavailable {
        class: ComputeClass,
        machine_type: String,
        spot: bool,
    },
    /// The pod's node is not part of the snapshot
    UnknownNode { workload: String, node: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::SpotFallback { .. } => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Short machine-readable name, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::OutOfRange { .. } => "out_of_range",
            Diagnostic::NoMatchingClass { .. } => "no_matching_class",
            Diagnostic::UnknownGpuModel { .. } => "unknown_gpu_model",
            Diagnostic::UnknownMachineFamily { .. } => "unknown_machine_family",
            Diagnostic::MalformedMachineType { .. } => "malformed_machine_type",
            Diagnostic::SpotFallback { .. } => "spot_fallback",
            Diagnostic::PriceUnavailable { .. } => "price_unavailable",
            Diagnostic::UnknownNode { .. } => "unknown_node",
        }
    }
}

fn spot_label(spot: bool) -> &'static str {
    if spot {
        "spot"
    } else {
        "on-demand"
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::OutOfRange {
                workload,
                class,
                gpu_model,
                cpu_milli,
                memory_mebibytes,
            } => {
                write!(
                    f,
                    "workload {workload} requests {cpu_milli} mCPU / {memory_mebibytes} MiB, "
                )?;
                write!(f, "outside the accepted range for {class}")?;
                if let Some(model) = gpu_model {
                    write!(f, " ({model})")?;
                }
                Ok(())
            }
            Diagnostic::NoMatchingClass { workload } => write!(
                f,
                "no compute class matches workload {workload}, defaulting to {}",
                ComputeClass::GeneralPurpose
            ),
            Diagnostic::UnknownGpuModel { class, model, spot } => write!(
                f,
                "{} GPU pricing for {model} is not available in the {class} class",
                spot_label(*spot)
            ),
            Diagnostic::UnknownMachineFamily { machine_type, spot } => write!(
                f,
                "{} machine type {machine_type} has no base price",
                spot_label(*spot)
            ),
            Diagnostic::MalformedMachineType { machine_type } => {
                write!(f, "machine type {machine_type:?} is not <family>-<class>-<cores>")
            }
            Diagnostic::SpotFallback { family } => write!(
                f,
                "{family} machines have no spot price, using the on-demand price"
            ),
            Diagnostic::PriceUnavailable {
                class,
                machine_type,
                spot,
            } => write!(
                f,
                "{} {class} premium for {machine_type} is not available",
                spot_label(*spot)
            ),
            Diagnostic::UnknownNode { workload, node } => {
                write!(f, "workload {workload} runs on unknown node {node}")
            }
        }
    }
}
