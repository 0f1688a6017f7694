//! Classification scenarios against the built-in thresholds

use super::*;
use crate::config::{EstimatorConfig, DEFAULT_CONFIG};
use crate::diagnostics::Diagnostic;
use crate::models::ComputeClass;

fn thresholds() -> ClassificationThresholds {
    EstimatorConfig::from_toml_str(DEFAULT_CONFIG)
        .unwrap()
        .classification
}

fn shape<'a>(machine_type: &'a str, cpu_milli: u64, memory_mebibytes: u64) -> WorkloadShape<'a> {
    WorkloadShape {
        workload: "test-pod",
        machine_type,
        cpu_milli,
        memory_mebibytes,
        gpu_count: 0,
        gpu_model: None,
        arm64: false,
    }
}

fn decide(thresholds: &ClassificationThresholds, shape: WorkloadShape<'_>) -> Classification {
    Classifier::new(thresholds).decide_class(&shape)
}

mod ratio_classes {
    use super::*;

    #[test]
    fn test_one_to_one_is_general_purpose() {
        let t = thresholds();
        let result = decide(&t, shape("e2-standard-4", 10000, 10000));
        assert_eq!(result.class, ComputeClass::GeneralPurpose);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_above_general_ceiling_is_balanced() {
        let t = thresholds();
        let result = decide(&t, shape("e2-standard-4", 35000, 100000));
        assert_eq!(result.class, ComputeClass::Balanced);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_one_to_four_above_general_ceiling_is_scaleout() {
        let t = thresholds();
        let result = decide(&t, shape("e2-standard-4", 40000, 160000));
        assert_eq!(result.class, ComputeClass::Scaleout);
    }

    #[test]
    fn test_general_purpose_wins_over_scaleout_when_both_fit() {
        let t = thresholds();
        // ratio 4 fits both bands, general-purpose is evaluated first
        let result = decide(&t, shape("e2-standard-4", 4000, 16000));
        assert_eq!(result.class, ComputeClass::GeneralPurpose);
    }

    #[test]
    fn test_no_match_falls_back_to_general_purpose() {
        let t = thresholds();
        let result = decide(&t, shape("e2-standard-4", 300000, 300000));
        assert_eq!(result.class, ComputeClass::GeneralPurpose);
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::NoMatchingClass {
                workload: "test-pod".to_string()
            }]
        );
    }

    #[test]
    fn test_zeroed_configuration_always_falls_back() {
        let t = ClassificationThresholds::default();
        for (cpu, mem) in [(50, 52), (10000, 10000), (35000, 100000)] {
            let result = decide(&t, shape("e2-standard-4", cpu, mem));
            assert_eq!(result.class, ComputeClass::GeneralPurpose);
            assert_eq!(result.diagnostics.len(), 1);
        }
    }
}

mod priority {
    use super::*;

    #[test]
    fn test_compute_optimized_family_is_performance() {
        let t = thresholds();
        let result = decide(&t, shape("c2d-standard-8", 10000, 10000));
        assert_eq!(result.class, ComputeClass::Performance);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_flagship_gpu_is_performance() {
        let t = thresholds();
        let mut s = shape("a3-highgpu-8", 8000, 32000);
        s.gpu_count = 8;
        s.gpu_model = Some("nvidia-h100-80gb");
        let result = decide(&t, s);
        assert_eq!(result.class, ComputeClass::Performance);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_flagship_gpu_out_of_range_only_warns() {
        let t = thresholds();
        let mut s = shape("a3-highgpu-8", 1000, 20000);
        s.gpu_count = 1;
        s.gpu_model = Some("nvidia-h100-80gb");
        let result = decide(&t, s);
        assert_eq!(result.class, ComputeClass::Performance);
        assert!(matches!(
            result.diagnostics.as_slice(),
            [Diagnostic::OutOfRange {
                class: ComputeClass::Performance,
                ..
            }]
        ));
    }

    #[test]
    fn test_accelerator_family_beats_gpu_pod_regardless_of_ratio() {
        let t = thresholds();
        for (cpu, mem) in [(1000, 1000), (1000, 8000), (20000, 100000)] {
            let mut s = shape("g2-standard-8", cpu, mem);
            s.gpu_count = 1;
            s.gpu_model = Some("nvidia-l4");
            assert_eq!(decide(&t, s).class, ComputeClass::Accelerator);
        }
    }

    #[test]
    fn test_accelerator_out_of_range_only_warns() {
        let t = thresholds();
        let mut s = shape("g2-standard-96", 90000, 360000);
        s.gpu_count = 8;
        s.gpu_model = Some("nvidia-l4");
        let result = decide(&t, s);
        assert_eq!(result.class, ComputeClass::Accelerator);
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_gpu_request_without_accelerator_family_is_gpu_pod() {
        let t = thresholds();
        let mut s = shape("n1-standard-8", 4000, 16000);
        s.gpu_count = 1;
        s.gpu_model = Some("nvidia-tesla-t4");
        let result = decide(&t, s);
        assert_eq!(result.class, ComputeClass::GpuPod);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_gpu_pod_below_model_minimum_warns() {
        let t = thresholds();
        let mut s = shape("n1-standard-8", 500, 512);
        s.gpu_count = 1;
        s.gpu_model = Some("nvidia-tesla-a100");
        let result = decide(&t, s);
        assert_eq!(result.class, ComputeClass::GpuPod);
        match result.diagnostics.as_slice() {
            [Diagnostic::OutOfRange { gpu_model, .. }] => {
                assert_eq!(gpu_model.as_deref(), Some("nvidia-tesla-a100"))
            }
            other => panic!("unexpected diagnostics: {other:?}"),
        }
    }

    #[test]
    fn test_gpu_pod_with_unknown_model_has_no_band_to_check() {
        let t = thresholds();
        let mut s = shape("n1-standard-8", 4000, 16000);
        s.gpu_count = 2;
        s.gpu_model = Some("nvidia-b200");
        let result = decide(&t, s);
        assert_eq!(result.class, ComputeClass::GpuPod);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_arm64_is_scaleout_arm() {
        let t = thresholds();
        let mut s = shape("t2a-standard-48", 43000, 172000);
        s.arm64 = true;
        let result = decide(&t, s);
        assert_eq!(result.class, ComputeClass::ScaleoutArm);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_arm64_out_of_band_still_scaleout_arm() {
        let t = thresholds();
        let mut s = shape("t2a-standard-4", 1000, 1000);
        s.arm64 = true;
        let result = decide(&t, s);
        assert_eq!(result.class, ComputeClass::ScaleoutArm);
        assert_eq!(result.diagnostics.len(), 1);
    }
}

#[test]
fn test_classifier_is_total() {
    let t = thresholds();
    let zeroed = ClassificationThresholds::default();
    let machines = ["", "e2-standard-4", "c2-standard-4", "g2-standard-8", "t2a-standard-4"];
    let models = [None, Some(""), Some("nvidia-l4"), Some("nvidia-h100-80gb"), Some("unknown")];
    let sizes = [(0u64, 0u64), (50, 52), (50, 100_000), (250_000, 50), (u64::MAX, u64::MAX)];

    for thresholds in [&t, &zeroed] {
        for machine_type in machines {
            for gpu_model in models {
                for (cpu_milli, memory_mebibytes) in sizes {
                    for gpu_count in [0, 1] {
                        for arm64 in [false, true] {
                            let s = WorkloadShape {
                                workload: "w",
                                machine_type,
                                cpu_milli,
                                memory_mebibytes,
                                gpu_count,
                                gpu_model,
                                arm64,
                            };
                            let result = decide(thresholds, s);
                            assert!(ComputeClass::ALL.contains(&result.class));
                        }
                    }
                }
            }
        }
    }
}
