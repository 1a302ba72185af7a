//! Experiment configuration.
//!
//! Loaded once from a JSON file and passed by value to the generator and
//! the experiment runner. Layout:
//!
//! ```json
//! {
//!   "difficulty_parameters": { "num_jobs": 10 },
//!   "fixed_parameters": {
//!     "operations_per_job": [2, 5],
//!     "flexibility": [1, 3],
//!     "machine_scaling_exponent": 0.5,
//!     "operation_duration": [10, 100]
//!   },
//!   "experiment_parameters": {
//!     "num_seeds": 10,
//!     "random_seed_base": 42,
//!     "test_name": "baseline"
//!   },
//!   "algorithms": { "shortest_processing_time": true }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dispatching::{rules, PriorityRule};
use crate::error::ConfigError;
use crate::generator::GeneratorConfig;
use crate::models::Time;

/// Instance size knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParameters {
    pub num_jobs: usize,
}

/// Instance shape knobs held constant across a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedParameters {
    pub operations_per_job: [usize; 2],
    pub flexibility: [usize; 2],
    pub machine_scaling_exponent: f64,
    #[serde(default = "default_duration")]
    pub operation_duration: [Time; 2],
}

fn default_duration() -> [Time; 2] {
    GeneratorConfig::default().operation_duration
}

/// Seeds and naming of one test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParameters {
    pub num_seeds: u64,
    pub random_seed_base: u64,
    #[serde(default = "default_test_name")]
    pub test_name: String,
}

fn default_test_name() -> String {
    "default_test".to_string()
}

/// Full experiment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub difficulty_parameters: DifficultyParameters,
    pub fixed_parameters: FixedParameters,
    pub experiment_parameters: ExperimentParameters,
    /// Rule name to enabled flag.
    #[serde(default)]
    pub algorithms: BTreeMap<String, bool>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let gen = GeneratorConfig::default();
        Self {
            difficulty_parameters: DifficultyParameters {
                num_jobs: gen.num_jobs,
            },
            fixed_parameters: FixedParameters {
                operations_per_job: gen.operations_per_job,
                flexibility: gen.flexibility,
                machine_scaling_exponent: gen.machine_scaling_exponent,
                operation_duration: gen.operation_duration,
            },
            experiment_parameters: ExperimentParameters {
                num_seeds: 10,
                random_seed_base: 0,
                test_name: default_test_name(),
            },
            algorithms: BTreeMap::from([(RuleKind::ShortestProcessingTime.to_string(), true)]),
        }
    }
}

impl ExperimentConfig {
    /// Reads and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides the number of seeds.
    pub fn with_num_seeds(mut self, num_seeds: u64) -> Self {
        self.experiment_parameters.num_seeds = num_seeds;
        self
    }

    /// Overrides the test name.
    pub fn with_test_name(mut self, test_name: impl Into<String>) -> Self {
        self.experiment_parameters.test_name = test_name.into();
        self
    }

    /// Enables one rule.
    pub fn with_rule(mut self, kind: RuleKind) -> Self {
        self.algorithms.insert(kind.to_string(), true);
        self
    }

    /// Generator parameters carried by this configuration.
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            num_jobs: self.difficulty_parameters.num_jobs,
            operations_per_job: self.fixed_parameters.operations_per_job,
            flexibility: self.fixed_parameters.flexibility,
            machine_scaling_exponent: self.fixed_parameters.machine_scaling_exponent,
            operation_duration: self.fixed_parameters.operation_duration,
        }
    }

    /// Seeds covered by this test, in run order.
    pub fn seeds(&self) -> std::ops::Range<u64> {
        let base = self.experiment_parameters.random_seed_base;
        base..base.saturating_add(self.experiment_parameters.num_seeds)
    }

    /// Enabled rules that this crate knows, in [`RuleKind::ALL`] order.
    ///
    /// Unknown names are logged and skipped.
    pub fn enabled_rules(&self) -> Vec<RuleKind> {
        let mut kinds: Vec<RuleKind> = self
            .algorithms
            .iter()
            .filter(|&(_, &enabled)| enabled)
            .filter_map(|(name, _)| match name.parse::<RuleKind>() {
                Ok(kind) => Some(kind),
                Err(err) => {
                    warn!(rule = %name, "{err}");
                    None
                }
            })
            .collect();
        kinds.sort();
        kinds
    }

    /// Checks generator ranges, the seed count, and that something will run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator_config().validate()?;
        if self.experiment_parameters.num_seeds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "num_seeds",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.experiment_parameters.test_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "test_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.enabled_rules().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "algorithms",
                reason: "no known rule is enabled".to_string(),
            });
        }
        Ok(())
    }
}

/// Built-in rules selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    ShortestProcessingTime,
    LongestProcessingTime,
    MostWorkRemaining,
    LeastWorkRemaining,
    MostOperationsRemaining,
    LeastFlexibility,
    EarliestStartTime,
}

impl RuleKind {
    /// Every selectable rule.
    pub const ALL: [RuleKind; 7] = [
        RuleKind::ShortestProcessingTime,
        RuleKind::LongestProcessingTime,
        RuleKind::MostWorkRemaining,
        RuleKind::LeastWorkRemaining,
        RuleKind::MostOperationsRemaining,
        RuleKind::LeastFlexibility,
        RuleKind::EarliestStartTime,
    ];

    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::ShortestProcessingTime => "shortest_processing_time",
            RuleKind::LongestProcessingTime => "longest_processing_time",
            RuleKind::MostWorkRemaining => "most_work_remaining",
            RuleKind::LeastWorkRemaining => "least_work_remaining",
            RuleKind::MostOperationsRemaining => "most_operations_remaining",
            RuleKind::LeastFlexibility => "least_flexibility",
            RuleKind::EarliestStartTime => "earliest_start_time",
        }
    }

    /// The rule value.
    pub fn rule(self) -> Arc<dyn PriorityRule> {
        match self {
            RuleKind::ShortestProcessingTime => Arc::new(rules::Spt),
            RuleKind::LongestProcessingTime => Arc::new(rules::Lpt),
            RuleKind::MostWorkRemaining => Arc::new(rules::Mwkr),
            RuleKind::LeastWorkRemaining => Arc::new(rules::Lwkr),
            RuleKind::MostOperationsRemaining => Arc::new(rules::Mopnr),
            RuleKind::LeastFlexibility => Arc::new(rules::LeastFlex),
            RuleKind::EarliestStartTime => Arc::new(rules::Est),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidValue {
                name: "algorithms",
                reason: format!("unknown rule '{s}'"),
            })
    }
}
