//! Serializable benchmark configuration.
//!
//! A `BenchConfig` captures everything needed to reproduce a benchmark run:
//! dataset path, simulation parameters, allocation limits and strategy
//! knobs, and harness settings. There are no module-level constants —
//! components receive the configuration they need explicitly, so multiple
//! datasets or parameter sets can run side by side without
//! cross-contamination.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use allocbench_core::{AllocationLimits, GreedyConfig, KnapsackConfig, SimulationConfig};

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration, typically loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
}

/// Dataset location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub csv_path: PathBuf,
}

/// Allocation limits plus the per-strategy knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AllocationConfig {
    #[serde(flatten)]
    pub limits: AllocationLimits,
    #[serde(default)]
    pub greedy: GreedyConfig,
    #[serde(default)]
    pub knapsack: KnapsackConfig,
}

/// Harness settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Repeated invocations per strategy for timing stability.
    #[serde(default = "default_num_runs")]
    pub num_runs: usize,
}

fn default_num_runs() -> usize {
    5
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            num_runs: default_num_runs(),
        }
    }
}

impl BenchConfig {
    /// Load and validate a TOML config file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: BenchConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.num_simulations == 0 {
            return Err(ConfigError::Invalid(
                "simulation.num_simulations must be positive".into(),
            ));
        }
        if self.simulation.trading_days_per_year == 0 {
            return Err(ConfigError::Invalid(
                "simulation.trading_days_per_year must be positive".into(),
            ));
        }
        let limits = &self.allocation.limits;
        if !(0.0..1.0).contains(&limits.min_weight) {
            return Err(ConfigError::Invalid(format!(
                "allocation.min_weight {} outside [0, 1)",
                limits.min_weight
            )));
        }
        if limits.max_weight <= limits.min_weight || limits.max_weight > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "allocation.max_weight {} must lie in ({}, 1]",
                limits.max_weight, limits.min_weight
            )));
        }
        if self.allocation.knapsack.capacity_steps == 0 {
            return Err(ConfigError::Invalid(
                "allocation.knapsack.capacity_steps must be positive".into(),
            ));
        }
        if self.benchmark.num_runs == 0 {
            return Err(ConfigError::Invalid(
                "benchmark.num_runs must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[data]
csv_path = "data/closes.csv"

[simulation]
num_simulations = 2000
trading_days_per_year = 252
risk_free_rate = 0.04
seed = 42

[allocation]
min_weight = 0.01
max_weight = 0.25

[allocation.greedy]
top_k = 10

[allocation.knapsack]
capacity_steps = 500
candidates_per_stock = 6

[benchmark]
num_runs = 3
"#;

    #[test]
    fn parses_full_toml() {
        let config: BenchConfig = toml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();
        assert_eq!(config.simulation.num_simulations, 2000);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.allocation.limits.min_weight, 0.01);
        assert_eq!(config.allocation.greedy.top_k, Some(10));
        assert_eq!(config.allocation.knapsack.capacity_steps, 500);
        assert_eq!(config.benchmark.num_runs, 3);
    }

    #[test]
    fn sections_default_when_omitted() {
        let config: BenchConfig = toml::from_str("[data]\ncsv_path = \"x.csv\"\n").unwrap();
        config.validate().unwrap();
        assert_eq!(config.simulation.num_simulations, 10_000);
        assert_eq!(config.simulation.trading_days_per_year, 252);
        assert_eq!(config.allocation.limits.min_weight, 0.005);
        assert_eq!(config.allocation.limits.max_weight, 0.10);
        assert_eq!(config.benchmark.num_runs, 5);
    }

    #[test]
    fn rejects_zero_runs() {
        let mut config: BenchConfig = toml::from_str("[data]\ncsv_path = \"x.csv\"\n").unwrap();
        config.benchmark.num_runs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_inverted_weight_bounds() {
        let mut config: BenchConfig = toml::from_str("[data]\ncsv_path = \"x.csv\"\n").unwrap();
        config.allocation.limits.min_weight = 0.5;
        config.allocation.limits.max_weight = 0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config: BenchConfig = toml::from_str(SAMPLE).unwrap();
        let text = toml::to_string(&config).unwrap();
        let back: BenchConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
