//! Schedule quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time |
//! | Lower Bound | Best instance lower bound on C_max |
//! | Gap | C_max / LB - 1 |
//! | Avg Utilization | Mean machine busyness over C_max |
//! | Idle Time | Sum over machines of (C_max - busy) |
//! | Avg Completion | Mean job completion time |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Instance, MachineId, Schedule, Time};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Latest completion time.
    pub makespan: Time,
    /// Instance lower bound on the optimal makespan.
    pub lower_bound: Time,
    /// Relative distance to the lower bound (0.0 = provably optimal).
    pub gap: f64,
    /// Average machine utilization over the makespan (0.0..1.0).
    pub avg_utilization: f64,
    /// Utilization per machine, every machine included.
    pub utilization_by_machine: BTreeMap<MachineId, f64>,
    /// Total idle machine time within `[0, makespan)`.
    pub total_idle_time: Time,
    /// Mean job completion time.
    pub avg_completion_time: Time,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its instance.
    pub fn calculate(schedule: &Schedule, instance: &Instance) -> Self {
        let makespan = schedule.computed_makespan();
        let lower_bound = instance.makespan_lower_bound();
        let gap = if lower_bound > 0.0 {
            makespan / lower_bound - 1.0
        } else {
            0.0
        };

        let busy = schedule.machine_busy_time();
        let utilization_by_machine: BTreeMap<MachineId, f64> = (0..instance.num_machines())
            .map(|m| {
                let b = busy.get(&m).copied().unwrap_or(0.0);
                let util = if makespan > 0.0 { b / makespan } else { 0.0 };
                (m, util)
            })
            .collect();

        let avg_utilization = if utilization_by_machine.is_empty() {
            0.0
        } else {
            utilization_by_machine.values().sum::<f64>() / utilization_by_machine.len() as f64
        };

        let total_busy: Time = busy.values().sum();
        let total_idle_time = (makespan * instance.num_machines() as f64 - total_busy).max(0.0);

        let completions: Vec<Time> = (0..instance.num_jobs())
            .filter_map(|j| schedule.job_completion_time(j))
            .collect();
        let avg_completion_time = if completions.is_empty() {
            0.0
        } else {
            completions.iter().sum::<Time>() / completions.len() as f64
        };

        Self {
            makespan,
            lower_bound,
            gap,
            avg_utilization,
            utilization_by_machine,
            total_idle_time,
            avg_completion_time,
        }
    }

    /// Whether the schedule is within `max_gap` of the lower bound.
    pub fn within_gap(&self, max_gap: f64) -> bool {
        self.gap <= max_gap
    }
}
