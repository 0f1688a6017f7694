//! Tiered hourly pricing
//!
//! Rate-based classes pay per-resource rates. Performance and Accelerator
//! pay class premiums on top of the underlying machine's base price; GPU pods
//! pay per-resource GPU-pod rates plus a per-GPU rate.

mod machine;
mod table;


pub use machine::{machine_price, MachineShape};
pub use table::{GpuEntry, MachineEntry, MachineRate, PriceTable, PriceTableDocument, RateEntry};

use crate::diagnostics::Diagnostic;
use crate::models::{ComputeClass, ResourceKind, ResourceTriple};

/// Inputs for one pricing call
#[derive(Debug, Clone, Copy)]
pub struct PricingRequest<'a> {
    pub resources: ResourceTriple,
    pub gpu_count: u32,
    pub gpu_model: Option<&'a str>,
    pub class: ComputeClass,
    pub machine_type: &'a str,
    pub spot: bool,
}

/// Hourly cost plus findings about missing prices
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub hourly_cost: f64,
    pub diagnostics: Vec<Diagnostic>,
}

/// Composes hourly cost from a [`PriceTable`]
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine<'a> {
    table: &'a PriceTable,
}

impl<'a> PricingEngine<'a> {
    pub fn new(table: &'a PriceTable) -> Self {
        Self { table }
    }

    /// Hourly cost of a workload. Never negative; missing entries count as 0.
    pub fn price(&self, request: &PricingRequest<'_>) -> PriceQuote {
        let mut diagnostics = Vec::new();
        let class = request.class;

        let cost = match class {
            ComputeClass::GeneralPurpose
            | ComputeClass::Balanced
            | ComputeClass::Scaleout
            | ComputeClass::ScaleoutArm => {
                let cost = self.resource_cost(class, ComputeClass::GeneralPurpose, request);
                if cost == 0.0 {
                    diagnostics.push(self.unavailable(request));
                }
                cost
            }
            ComputeClass::Performance => {
                let premium = self.resource_cost(class, class, request);
                if premium == 0.0 {
                    diagnostics.push(self.unavailable(request));
                }
                premium + self.machine_base(request, &mut diagnostics)
            }
            ComputeClass::Accelerator => {
                // An unknown GPU voids the whole premium
                let premium = match self.gpu_cost(request, &mut diagnostics) {
                    Some(gpus) => {
                        let resources = self.resource_cost(class, class, request);
                        if resources == 0.0 {
                            diagnostics.push(self.unavailable(request));
                        }
                        resources + gpus
                    }
                    None => 0.0,
                };
                premium + self.machine_base(request, &mut diagnostics)
            }
            ComputeClass::GpuPod => self
                .gpu_cost(request, &mut diagnostics)
                .map_or(0.0, |gpus| self.resource_cost(class, class, request) + gpus),
        };

        PriceQuote {
            hourly_cost: cost.max(0.0),
            diagnostics,
        }
    }

    /// cpu and memory at `class` rates, storage at `storage_class` rates
    fn resource_cost(
        &self,
        class: ComputeClass,
        storage_class: ComputeClass,
        request: &PricingRequest<'_>,
    ) -> f64 {
        let r = &request.resources;
        let rate = |class: ComputeClass, resource: ResourceKind| {
            self.table.rate(class, request.spot, resource).unwrap_or(0.0)
        };

        per_thousand(rate(class, ResourceKind::Cpu), r.cpu_milli)
            + per_thousand(rate(class, ResourceKind::Memory), r.memory_mebibytes)
            + per_thousand(rate(storage_class, ResourceKind::Storage), r.storage_mebibytes)
    }

    /// Per-GPU rate times count, or `None` when the model has no rate
    fn gpu_cost(
        &self,
        request: &PricingRequest<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<f64> {
        let model = request.gpu_model.unwrap_or_default();
        match self.table.gpu_rate(request.class, request.spot, model) {
            Some(rate) => Some(rate * request.gpu_count as f64),
            None => {
                diagnostics.push(Diagnostic::UnknownGpuModel {
                    class: request.class,
                    model: model.to_string(),
                    spot: request.spot,
                });
                None
            }
        }
    }

    fn machine_base(&self, request: &PricingRequest<'_>, diagnostics: &mut Vec<Diagnostic>) -> f64 {
        let (price, found) = machine_price(self.table, request.machine_type, request.spot);
        diagnostics.extend(found);
        price
    }

    fn unavailable(&self, request: &PricingRequest<'_>) -> Diagnostic {
        Diagnostic::PriceUnavailable {
            class: request.class,
            machine_type: request.machine_type.to_string(),
            spot: request.spot,
        }
    }
}

fn per_thousand(rate: f64, amount: u64) -> f64 {
    rate * amount as f64 / 1000.0
}
