//! Random instance generation.
//!
//! Instances are drawn from a seeded [`StdRng`], so one `(config, seed)` pair
//! always yields the same instance. The machine count grows sublinearly with
//! the job count:
//!
//! ```text
//! num_machines = max(1, floor(num_jobs ^ machine_scaling_exponent))
//! ```
//!
//! Each operation draws a flexibility from `flexibility` (capped at the
//! machine count), samples that many distinct machines, and draws one
//! duration shared by all of them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::models::{Instance, Job, Operation, Time};

/// Parameters of the random instance family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of jobs per instance.
    pub num_jobs: usize,
    /// Inclusive `[min, max]` operations per job.
    pub operations_per_job: [usize; 2],
    /// Inclusive `[min, max]` eligible machines per operation.
    pub flexibility: [usize; 2],
    /// Exponent of the job-count to machine-count scaling law.
    pub machine_scaling_exponent: f64,
    /// Half-open `[lo, hi)` duration range.
    pub operation_duration: [Time; 2],
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_jobs: 10,
            operations_per_job: [2, 5],
            flexibility: [1, 3],
            machine_scaling_exponent: 0.5,
            operation_duration: [10.0, 100.0],
        }
    }
}

impl GeneratorConfig {
    /// Sets the job count.
    pub fn with_num_jobs(mut self, num_jobs: usize) -> Self {
        self.num_jobs = num_jobs;
        self
    }

    /// Machine count implied by the scaling law.
    pub fn num_machines(&self) -> usize {
        let scaled = (self.num_jobs as f64).powf(self.machine_scaling_exponent);
        (scaled.floor() as usize).max(1)
    }

    /// Checks every range and scalar.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [op_min, op_max] = self.operations_per_job;
        if op_min == 0 || op_min > op_max {
            return Err(ConfigError::InvalidRange {
                name: "operations_per_job",
                min: op_min as f64,
                max: op_max as f64,
            });
        }

        let [flex_min, flex_max] = self.flexibility;
        if flex_min == 0 || flex_min > flex_max {
            return Err(ConfigError::InvalidRange {
                name: "flexibility",
                min: flex_min as f64,
                max: flex_max as f64,
            });
        }

        let [lo, hi] = self.operation_duration;
        if !(lo.is_finite() && hi.is_finite()) || lo <= 0.0 || lo > hi {
            return Err(ConfigError::InvalidRange {
                name: "operation_duration",
                min: lo,
                max: hi,
            });
        }

        let exp = self.machine_scaling_exponent;
        if !exp.is_finite() || exp < 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "machine_scaling_exponent",
                reason: format!("{exp} is not a finite non-negative number"),
            });
        }
        if self.num_machines() > self.num_jobs.max(1) {
            return Err(ConfigError::InvalidValue {
                name: "machine_scaling_exponent",
                reason: format!(
                    "{exp} yields more machines than jobs for {} jobs",
                    self.num_jobs
                ),
            });
        }

        Ok(())
    }
}

/// Seeded generator over one [`GeneratorConfig`].
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    config: GeneratorConfig,
}

impl InstanceGenerator {
    /// Validates `config` and wraps it.
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The wrapped configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates the instance for `seed`.
    pub fn generate(&self, seed: u64) -> Result<Instance, ConfigError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let num_machines = self.config.num_machines();
        let [op_min, op_max] = self.config.operations_per_job;
        let [flex_min, flex_max] = self.config.flexibility;
        let flex_hi = flex_max.min(num_machines);
        let flex_lo = flex_min.min(flex_hi);

        let jobs = (0..self.config.num_jobs)
            .map(|_| {
                let count = rng.random_range(op_min..=op_max);
                Job::from_operations((0..count).map(|_| {
                    let flexibility = rng.random_range(flex_lo..=flex_hi);
                    let machines =
                        rand::seq::index::sample(&mut rng, num_machines, flexibility).into_vec();
                    Operation::new(self.draw_duration(&mut rng), machines)
                }))
            })
            .collect();

        let instance = Instance::new(num_machines, jobs)?.with_seed(seed);
        debug!(
            seed,
            jobs = instance.num_jobs(),
            machines = num_machines,
            operations = instance.total_operations(),
            "generated instance"
        );
        Ok(instance)
    }

    fn draw_duration<R: Rng>(&self, rng: &mut R) -> Time {
        let [lo, hi] = self.config.operation_duration;
        if hi > lo {
            rng.random_range(lo..hi)
        } else {
            lo
        }
    }
}
