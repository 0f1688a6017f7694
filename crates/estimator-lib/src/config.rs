//! Estimator configuration
//!
//! Layers, lowest precedence first: the built-in defaults compiled into the
//! crate, an optional TOML file, then `ESTIMATOR__*` environment variables
//! (`__` separates nesting levels, e.g.
//! `ESTIMATOR__CLASSIFICATION__LIMITS__BALANCED__MCPU_MAX`).

use crate::classifier::ClassificationThresholds;
use crate::error::Result;
use crate::normalizer::NormalizerPolicy;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

/// Defaults shipped with the crate
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "ESTIMATOR";

/// Keys holding lists, as seen by the environment layer
const LIST_KEYS: &[&str] = &[
    "excluded_namespaces",
    "classification.machines.compute_optimized_prefixes",
    "classification.machines.accelerator_optimized_prefixes",
];

/// Cluster-level billing constants
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Flat hourly management fee per cluster
    pub cluster_fee: f64,
    /// Multiplier applied to on-demand cost under a one year commitment
    pub one_year_commit_discount: f64,
    /// Multiplier applied to on-demand cost under a three year commitment
    pub three_year_commit_discount: f64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            cluster_fee: 0.1,
            one_year_commit_discount: 1.0,
            three_year_commit_discount: 1.0,
        }
    }
}

/// Complete configuration consumed by the estimator
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub normalizer: NormalizerPolicy,
    pub classification: ClassificationThresholds,
    pub billing: BillingConfig,
    /// Pods in these namespaces are not estimated
    pub excluded_namespaces: Vec<String>,
}

impl EstimatorConfig {
    /// Built-in defaults with environment overrides
    pub fn builtin() -> Result<Self> {
        Self::load(None)
    }

    /// Built-in defaults, overlaid by `path` (if any) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_environment(path, Self::environment())
    }

    fn load_with_environment(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = Self::defaults_layer();

        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        let config = builder.add_source(environment).build()?;
        Ok(config.try_deserialize()?)
    }

    /// `ESTIMATOR__*` overrides. List keys take comma separated values.
    fn environment() -> Environment {
        LIST_KEYS.iter().fold(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .try_parsing(true),
            |environment, key| environment.with_list_parse_key(key),
        )
    }

    /// Parse a standalone TOML document without the built-in layer.
    /// Keys it leaves out read as zero.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Whether pods in `namespace` are skipped
    pub fn is_excluded(&self, namespace: &str) -> bool {
        self.excluded_namespaces.iter().any(|ns| ns == namespace)
    }

    fn defaults_layer() -> ConfigBuilder<config::builder::DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Ceiling, RatioBand};
    use std::io::Write;

    #[test]
    fn test_builtin_defaults_parse() {
        let config = EstimatorConfig::from_toml_str(DEFAULT_CONFIG).unwrap();
        let c = &config.classification;

        assert_eq!(c.ratios.general_purpose, RatioBand::new(1.0, 6.5));
        assert_eq!(c.limits.balanced, Ceiling::new(222000, 851000));
        assert_eq!(c.machines.arm64_prefix, "t2a");
        assert_eq!(c.gpu_pod["nvidia-l4"].mcpu_max, 31000);
        assert_eq!(c.accelerator.models["nvidia-h100-80gb"].memory_max, 1795000);
        assert!(!config.normalizer.raise_memory_to_cpu);
        assert!(config.is_excluded("kube-system"));
        assert!(!config.is_excluded("default"));
        assert!((config.billing.cluster_fee - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_missing_keys_read_as_zero() {
        let config = EstimatorConfig::from_toml_str(
            r#"
            [classification.limits.balanced]
            mcpu_max = 1000
            "#,
        )
        .unwrap();

        let limits = &config.classification.limits;
        assert_eq!(limits.balanced.mcpu_max, 1000);
        assert_eq!(limits.balanced.memory_max, 0);
        assert_eq!(limits.general_purpose, Ceiling::default());
        assert_eq!(config.classification.ratios.scaleout, RatioBand::default());
        assert!(config.classification.gpu_pod.is_empty());
    }

    #[test]
    fn test_file_layer_overrides_builtin() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[normalizer]\nraise_memory_to_cpu = true\n").unwrap();
        writeln!(file, "[classification.limits.general_purpose]\nmcpu_max = 12000").unwrap();

        let config = EstimatorConfig::load(Some(file.path())).unwrap();
        assert!(config.normalizer.raise_memory_to_cpu);
        assert_eq!(config.classification.limits.general_purpose.mcpu_max, 12000);
        // Untouched keys keep the built-in value
        assert_eq!(config.classification.limits.general_purpose.memory_max, 110000);
    }

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let vars: config::Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        EstimatorConfig::environment().source(Some(vars))
    }

    #[test]
    fn test_environment_overrides_lists() {
        let config = EstimatorConfig::load_with_environment(
            None,
            environment(&[
                ("ESTIMATOR__EXCLUDED_NAMESPACES", "kube-system,monitoring"),
                ("ESTIMATOR__CLASSIFICATION__MACHINES__COMPUTE_OPTIMIZED_PREFIXES", "c3"),
            ]),
        )
        .unwrap();

        assert_eq!(config.excluded_namespaces, ["kube-system", "monitoring"]);
        assert_eq!(
            config.classification.machines.compute_optimized_prefixes,
            ["c3"]
        );
        // Other list keys keep the built-in value
        assert_eq!(
            config.classification.machines.accelerator_optimized_prefixes,
            ["a2", "a3", "g2"]
        );
    }

    #[test]
    fn test_environment_overrides_scalars() {
        let config = EstimatorConfig::load_with_environment(
            None,
            environment(&[
                ("ESTIMATOR__BILLING__CLUSTER_FEE", "0.25"),
                ("ESTIMATOR__NORMALIZER__RAISE_MEMORY_TO_CPU", "true"),
                ("ESTIMATOR__CLASSIFICATION__LIMITS__BALANCED__MCPU_MAX", "1000"),
            ]),
        )
        .unwrap();

        assert!((config.billing.cluster_fee - 0.25).abs() < 1e-12);
        assert!(config.normalizer.raise_memory_to_cpu);
        assert_eq!(config.classification.limits.balanced.mcpu_max, 1000);
        assert_eq!(config.classification.limits.balanced.memory_max, 851000);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = EstimatorConfig::load(Some(Path::new("/nonexistent/estimator.toml")));
        assert!(result.is_err());
    }
}
