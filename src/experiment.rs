//! Seeded benchmark runs.
//!
//! For every seed of the configuration, one instance is generated and every
//! enabled rule schedules it. Each schedule is certified by the validator
//! before it is recorded, so a rule that produced an infeasible schedule
//! shows up in the statistics instead of silently winning.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ExperimentConfig, RuleKind};
use crate::error::ConfigError;
use crate::generator::InstanceGenerator;
use crate::models::{Instance, Schedule, Time};
use crate::scheduler::{DispatchScheduler, ScheduleKpi};
use crate::validation::validate;

/// One rule applied to one seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub seed: u64,
    pub rule: RuleKind,
    /// Makespan reported by the scheduler.
    pub makespan: Time,
    /// Makespan recomputed by the validator.
    pub validated_makespan: Time,
    pub is_valid: bool,
    pub violation_count: usize,
    /// Message of the first violation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_violation: Option<String>,
    /// Wall-clock scheduling time, validation excluded.
    pub execution_time_secs: f64,
    pub kpi: ScheduleKpi,
    pub schedule: Schedule,
}

/// Aggregate over all seeds of one rule.
///
/// Standard deviations are population deviations (0 for a single run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleStats {
    pub runs: usize,
    pub valid_runs: usize,
    pub avg_makespan: Time,
    pub min_makespan: Time,
    pub max_makespan: Time,
    pub makespan_std: Time,
    #[serde(rename = "avg_time")]
    pub avg_time_secs: f64,
    #[serde(rename = "time_std")]
    pub time_std_secs: f64,
    /// Mean relative gap to the instance lower bound.
    pub avg_gap: f64,
}

impl RuleStats {
    /// Aggregates a rule's runs. `None` when there are none.
    pub fn from_runs(runs: &[RunRecord]) -> Option<Self> {
        if runs.is_empty() {
            return None;
        }
        let n = runs.len() as f64;
        let makespans: Vec<Time> = runs.iter().map(|r| r.makespan).collect();
        let times: Vec<f64> = runs.iter().map(|r| r.execution_time_secs).collect();
        let (avg_makespan, makespan_std) = mean_and_std(&makespans);
        let (avg_time_secs, time_std_secs) = mean_and_std(&times);
        Some(Self {
            runs: runs.len(),
            valid_runs: runs.iter().filter(|r| r.is_valid).count(),
            avg_makespan,
            min_makespan: makespans.iter().copied().fold(Time::INFINITY, Time::min),
            max_makespan: makespans.iter().copied().fold(Time::NEG_INFINITY, Time::max),
            makespan_std,
            avg_time_secs,
            time_std_secs,
            avg_gap: runs.iter().map(|r| r.kpi.gap).sum::<f64>() / n,
        })
    }
}

/// Mean and population standard deviation of a non-empty sample.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Everything one experiment produced.
#[derive(Debug, Clone)]
pub struct ExperimentResults {
    pub config: ExperimentConfig,
    /// Generated instances, in seed order.
    pub instances: Vec<Instance>,
    /// Runs per rule, in seed order.
    pub runs: BTreeMap<RuleKind, Vec<RunRecord>>,
}

impl ExperimentResults {
    /// Per-rule statistics.
    pub fn stats(&self) -> BTreeMap<RuleKind, RuleStats> {
        self.runs
            .iter()
            .filter_map(|(&kind, runs)| RuleStats::from_runs(runs).map(|s| (kind, s)))
            .collect()
    }

    /// Whether every recorded schedule passed validation.
    pub fn all_valid(&self) -> bool {
        self.runs.values().flatten().all(|r| r.is_valid)
    }
}

/// A configured experiment.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
    generator: InstanceGenerator,
}

impl Experiment {
    /// Validates `config` and prepares its generator.
    pub fn new(config: ExperimentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = InstanceGenerator::new(config.generator_config())?;
        Ok(Self { config, generator })
    }

    /// The configuration this experiment runs.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Runs every enabled rule on every seed.
    pub fn run(&self) -> Result<ExperimentResults, ConfigError> {
        let kinds = self.config.enabled_rules();
        let seeds = self.config.seeds();
        info!(
            test = %self.config.experiment_parameters.test_name,
            seeds = seeds.end - seeds.start,
            rules = ?kinds,
            "starting experiment"
        );

        let schedulers: Vec<(RuleKind, DispatchScheduler)> = kinds
            .iter()
            .map(|&kind| (kind, DispatchScheduler::new().with_shared_rule(kind.rule())))
            .collect();

        let mut instances = Vec::new();
        let mut runs: BTreeMap<RuleKind, Vec<RunRecord>> = BTreeMap::new();

        for seed in seeds {
            let instance = self.generator.generate(seed)?;
            info!(
                seed,
                jobs = instance.num_jobs(),
                machines = instance.num_machines(),
                "instance generated"
            );

            for (kind, scheduler) in &schedulers {
                let record = run_one(seed, *kind, scheduler, &instance);
                info!(
                    seed,
                    rule = %kind,
                    makespan = record.makespan,
                    secs = record.execution_time_secs,
                    valid = record.is_valid,
                    "run complete"
                );
                runs.entry(*kind).or_default().push(record);
            }
            instances.push(instance);
        }

        Ok(ExperimentResults {
            config: self.config.clone(),
            instances,
            runs,
        })
    }
}

fn run_one(seed: u64, kind: RuleKind, scheduler: &DispatchScheduler, instance: &Instance) -> RunRecord {
    let started = Instant::now();
    let schedule = scheduler.schedule(instance);
    let execution_time_secs = started.elapsed().as_secs_f64();

    let report = validate(instance, &schedule);
    if !report.makespan_matches(schedule.makespan) {
        warn!(
            seed,
            rule = %kind,
            reported = schedule.makespan,
            recomputed = report.makespan,
            "reported makespan disagrees with placements"
        );
    }

    RunRecord {
        seed,
        rule: kind,
        makespan: schedule.makespan,
        validated_makespan: report.makespan,
        is_valid: report.is_valid,
        violation_count: report.violations.len(),
        first_violation: report.violations.first().map(|v| v.message.clone()),
        execution_time_secs,
        kpi: ScheduleKpi::calculate(&schedule, instance),
        schedule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ExperimentConfig {
        ExperimentConfig::default()
            .with_num_seeds(3)
            .with_test_name("unit")
            .with_rule(RuleKind::MostWorkRemaining)
    }

    #[test]
    fn test_run_covers_every_seed_and_rule() {
        let results = Experiment::new(small_config()).unwrap().run().unwrap();
        assert_eq!(results.instances.len(), 3);
        assert_eq!(results.runs.len(), 2);
        for runs in results.runs.values() {
            let seeds: Vec<u64> = runs.iter().map(|r| r.seed).collect();
            assert_eq!(seeds, vec![0, 1, 2]);
        }
        assert!(results.all_valid());
    }

    #[test]
    fn test_records_consistent() {
        let results = Experiment::new(small_config()).unwrap().run().unwrap();
        for run in results.runs.values().flatten() {
            assert!((run.makespan - run.validated_makespan).abs() < 1e-9);
            assert_eq!(run.violation_count, 0);
            assert!(run.execution_time_secs >= 0.0);
            assert!(run.first_violation.is_none());
            assert!(run.kpi.gap >= -1e-9);
            assert!((run.kpi.makespan - run.validated_makespan).abs() < 1e-9);
            let instance = &results.instances[run.seed as usize];
            assert_eq!(run.schedule.len(), instance.total_operations());
        }
    }

    #[test]
    fn test_stats() {
        let results = Experiment::new(small_config()).unwrap().run().unwrap();
        let stats = results.stats();
        let spt = &stats[&RuleKind::ShortestProcessingTime];
        assert_eq!(spt.runs, 3);
        assert_eq!(spt.valid_runs, 3);
        assert!(spt.min_makespan <= spt.avg_makespan);
        assert!(spt.avg_makespan <= spt.max_makespan);
    }

    #[test]
    fn test_reproducible() {
        let a = Experiment::new(small_config()).unwrap().run().unwrap();
        let b = Experiment::new(small_config()).unwrap().run().unwrap();
        for (kind, runs) in &a.runs {
            let other = &b.runs[kind];
            for (x, y) in runs.iter().zip(other) {
                assert_eq!(x.schedule, y.schedule);
            }
        }
    }

    #[test]
    fn test_stats_from_runs() {
        let run = |makespan: Time, is_valid: bool| RunRecord {
            seed: 0,
            rule: RuleKind::ShortestProcessingTime,
            makespan,
            validated_makespan: makespan,
            is_valid,
            violation_count: usize::from(!is_valid),
            first_violation: None,
            execution_time_secs: 0.5,
            kpi: ScheduleKpi::calculate(&Schedule::new(), &Instance::new(1, Vec::new()).unwrap()),
            schedule: Schedule::new(),
        };
        let stats = RuleStats::from_runs(&[run(10.0, true), run(20.0, false)]).unwrap();
        assert_eq!(stats.runs, 2);
        assert_eq!(stats.valid_runs, 1);
        assert!((stats.avg_makespan - 15.0).abs() < 1e-10);
        assert!((stats.min_makespan - 10.0).abs() < 1e-10);
        assert!((stats.max_makespan - 20.0).abs() < 1e-10);
        // population std of {10, 20}
        assert!((stats.makespan_std - 5.0).abs() < 1e-10);
        assert!((stats.avg_time_secs - 0.5).abs() < 1e-10);
        assert!(stats.time_std_secs.abs() < 1e-10);

        let single = RuleStats::from_runs(&[run(12.0, true)]).unwrap();
        assert!((single.makespan_std - 0.0).abs() < 1e-10);
        assert!(RuleStats::from_runs(&[]).is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ExperimentConfig::default().with_num_seeds(0);
        assert!(Experiment::new(config).is_err());
    }
}
