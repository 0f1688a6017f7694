//! Rounding of raw resource amounts to billable units
//!
//! Autopilot bills cpu in fixed mCPU steps and enforces minimum requests
//! for every dimension. Normalization is idempotent.

use crate::models::ResourceTriple;
use serde::Deserialize;

/// Billing granularity for cpu, in mCPU
pub const CPU_STEP_MILLI: u64 = 50;

/// Lowest billable cpu request, in mCPU
pub const CPU_MIN_MILLI: u64 = 50;

/// Lowest billable memory request, in MiB
pub const MEMORY_MIN_MEBIBYTES: u64 = 52;

/// Lowest billable ephemeral storage request, in MiB
pub const STORAGE_MIN_MEBIBYTES: u64 = 10;

/// Policy switches for normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NormalizerPolicy {
    /// Raise memory to match the rounded cpu value (1:1 minimum ratio)
    pub raise_memory_to_cpu: bool,
}

/// Rounds resource triples to billable values
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    policy: NormalizerPolicy,
}

impl Normalizer {
    pub fn new(policy: NormalizerPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> NormalizerPolicy {
        self.policy
    }

    /// Apply minimum floors, round cpu up to the step and, when enabled,
    /// raise memory to the rounded cpu value.
    pub fn normalize(
        &self,
        cpu_milli: u64,
        memory_mebibytes: u64,
        storage_mebibytes: u64,
    ) -> ResourceTriple {
        let cpu_milli = round_up_to_step(cpu_milli.max(CPU_MIN_MILLI), CPU_STEP_MILLI);
        let mut memory_mebibytes = memory_mebibytes.max(MEMORY_MIN_MEBIBYTES);
        let storage_mebibytes = storage_mebibytes.max(STORAGE_MIN_MEBIBYTES);

        if self.policy.raise_memory_to_cpu && cpu_milli > memory_mebibytes {
            memory_mebibytes = cpu_milli;
        }

        ResourceTriple {
            cpu_milli,
            memory_mebibytes,
            storage_mebibytes,
        }
    }

    pub fn normalize_triple(&self, triple: ResourceTriple) -> ResourceTriple {
        self.normalize(
            triple.cpu_milli,
            triple.memory_mebibytes,
            triple.storage_mebibytes,
        )
    }
}

/// Round up to a multiple of `step`, capped at the largest representable
/// multiple.
fn round_up_to_step(value: u64, step: u64) -> u64 {
    match value % step {
        0 => value,
        rem => value
            .checked_add(step - rem)
            .unwrap_or(u64::MAX - u64::MAX % step),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient() -> Normalizer {
        Normalizer::default()
    }

    fn ratio_floor() -> Normalizer {
        Normalizer::new(NormalizerPolicy {
            raise_memory_to_cpu: true,
        })
    }

    #[test]
    fn test_aligned_values_unchanged() {
        assert_eq!(
            lenient().normalize(1000, 1000, 1000),
            ResourceTriple::new(1000, 1000, 1000)
        );
        assert_eq!(
            ratio_floor().normalize(1000, 1000, 1000),
            ResourceTriple::new(1000, 1000, 1000)
        );
    }

    #[test]
    fn test_floors_and_rounding_without_ratio_floor() {
        assert_eq!(
            lenient().normalize(249, 49, 9),
            ResourceTriple::new(250, 52, 10)
        );
    }

    #[test]
    fn test_floors_and_rounding_with_ratio_floor() {
        assert_eq!(
            ratio_floor().normalize(249, 49, 9),
            ResourceTriple::new(250, 250, 10)
        );
    }

    #[test]
    fn test_rounds_up_to_next_step() {
        assert_eq!(
            lenient().normalize(1618, 1700, 900),
            ResourceTriple::new(1650, 1700, 900)
        );
        // Memory already above cpu, ratio floor has nothing to do
        assert_eq!(
            ratio_floor().normalize(1618, 1700, 900),
            ResourceTriple::new(1650, 1700, 900)
        );
    }

    #[test]
    fn test_cpu_near_overflow_stays_aligned() {
        let largest_aligned = u64::MAX - u64::MAX % CPU_STEP_MILLI;
        for cpu in [u64::MAX, u64::MAX - 1, largest_aligned + 1] {
            let normalized = lenient().normalize(cpu, 1, 1);
            assert_eq!(normalized.cpu_milli, largest_aligned, "{cpu}");
            assert_eq!(normalized.cpu_milli % CPU_STEP_MILLI, 0);
        }
        assert_eq!(
            lenient().normalize(largest_aligned, 1, 1).cpu_milli,
            largest_aligned
        );
    }

    #[test]
    fn test_zero_inputs_hit_minimums() {
        assert_eq!(
            lenient().normalize(0, 0, 0),
            ResourceTriple::new(CPU_MIN_MILLI, MEMORY_MIN_MEBIBYTES, STORAGE_MIN_MEBIBYTES)
        );
    }

    #[test]
    fn test_properties_hold_over_grid() {
        let samples = [
            0u64,
            1,
            9,
            10,
            49,
            50,
            51,
            52,
            99,
            249,
            250,
            1618,
            35000,
            100_001,
            u64::MAX - 1,
            u64::MAX,
        ];
        let largest_aligned = u64::MAX - u64::MAX % CPU_STEP_MILLI;
        for normalizer in [lenient(), ratio_floor()] {
            for &cpu in &samples {
                for &mem in &samples {
                    for &storage in &samples {
                        let once = normalizer.normalize(cpu, mem, storage);

                        assert_eq!(once.cpu_milli % CPU_STEP_MILLI, 0);
                        assert!(once.cpu_milli >= CPU_MIN_MILLI);
                        assert!(once.memory_mebibytes >= MEMORY_MIN_MEBIBYTES);
                        assert!(once.storage_mebibytes >= STORAGE_MIN_MEBIBYTES);
                        assert!(once.cpu_milli >= cpu.min(largest_aligned));
                        assert_eq!(normalizer.normalize_triple(once), once);

                        if normalizer.policy().raise_memory_to_cpu {
                            assert!(once.memory_mebibytes >= once.cpu_milli);
                        }
                    }
                }
            }
        }
    }
}
