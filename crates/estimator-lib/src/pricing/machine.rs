//! Machine-family base price lookup
//!
//! Machine types follow `<family>-<class>-<cores>`; RAM is implied by the
//! class.

use super::table::PriceTable;
use crate::diagnostics::Diagnostic;

/// Parsed machine type
#[derive(Debug, Clone, PartialEq)]
pub struct MachineShape {
    pub family: String,
    pub class: String,
    pub cores: u32,
    pub ram_gib: f64,
}

/// GiB of RAM per vCPU for a machine class
fn ram_per_core(class: &str) -> f64 {
    match class {
        "standard" => 4.0,
        "highcpu" => 2.0,
        "highmem" => 4.0,
        "highgpu" => 7.0833,
        "ultragpu" => 14.1666,
        _ => 0.0,
    }
}

impl MachineShape {
    /// Parse e.g. `c2d-highcpu-16` or `a3-highgpu-8g`. Core counts may carry
    /// a unit suffix, only the leading digits are read.
    pub fn parse(machine_type: &str) -> Option<Self> {
        let mut parts = machine_type.split('-');
        let family = parts.next().filter(|s| !s.is_empty())?;
        let class = parts.next().filter(|s| !s.is_empty())?;
        let size = parts.next()?;

        let digits: String = size.chars().take_while(|c| c.is_ascii_digit()).collect();
        let cores: u32 = digits.parse().ok()?;

        Some(Self {
            family: family.to_string(),
            class: class.to_string(),
            cores,
            ram_gib: (cores as f64 * ram_per_core(class)).ceil(),
        })
    }
}

/// Hourly base price of a whole machine. Returns 0 with a diagnostic when
/// the type cannot be parsed or the family has no rate.
pub fn machine_price(table: &PriceTable, machine_type: &str, spot: bool) -> (f64, Vec<Diagnostic>) {
    let Some(shape) = MachineShape::parse(machine_type) else {
        return (
            0.0,
            vec![Diagnostic::MalformedMachineType {
                machine_type: machine_type.to_string(),
            }],
        );
    };

    let mut diagnostics = Vec::new();
    let rate = match table.machine_rate(&shape.family, spot) {
        Some(rate) => Some(rate),
        None if spot => {
            let fallback = table.machine_rate(&shape.family, false);
            if fallback.is_some() {
                diagnostics.push(Diagnostic::SpotFallback {
                    family: shape.family.clone(),
                });
            }
            fallback
        }
        None => None,
    };

    match rate {
        Some(rate) => (
            rate.core * shape.cores as f64 + rate.ram * shape.ram_gib,
            diagnostics,
        ),
        None => {
            diagnostics.push(Diagnostic::UnknownMachineFamily {
                machine_type: machine_type.to_string(),
                spot,
            });
            (0.0, diagnostics)
        }
    }
}
