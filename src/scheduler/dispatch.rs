//! Greedy list scheduler for the flexible job shop.
//!
//! # Algorithm
//!
//! 1. The ready set holds the next unscheduled operation of every job.
//! 2. Select the ready operation preferred by the priority rule; remaining
//!    ties go to the lowest (job index, position).
//! 3. Place it on the eligible machine with the earliest feasible start
//!    `max(job_ready_time, machine_free_time)`; ties go to the lowest id.
//! 4. Advance machine and job clocks to the operation's end and replace the
//!    job's frontier with its next operation, if any.
//!
//! Operations are never inserted into earlier idle gaps and never moved once
//! placed (non-insertion, non-preemptive).
//!
//! # Complexity
//! O(n · j · f) where n = operations, j = jobs, f = average flexibility.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::dispatching::{rules, PriorityRule, ReadyOperation};
use crate::models::{Instance, Job, MachineId, Schedule, ScheduledOperation, Time};

/// Schedules `instance` with `rule` and returns one placement per operation.
///
/// Deterministic for a fixed instance and rule. Total for every instance:
/// each iteration schedules exactly one operation.
///
/// # Example
///
/// ```
/// use u_flexshop::dispatching::rules;
/// use u_flexshop::models::{Instance, Job, Operation};
/// use u_flexshop::scheduler::schedule;
///
/// let instance = Instance::new(
///     2,
///     vec![Job::from_operations([
///         Operation::new(3.0, [0, 1]),
///         Operation::new(5.0, [0, 1]),
///     ])],
/// )
/// .unwrap();
///
/// let schedule = schedule(&instance, &rules::Spt);
/// assert_eq!(schedule.len(), 2);
/// assert_eq!(schedule.makespan, 8.0);
/// ```
pub fn schedule<R: PriorityRule + ?Sized>(instance: &Instance, rule: &R) -> Schedule {
    let jobs = instance.jobs();
    let mut machine_free: Vec<Time> = vec![0.0; instance.num_machines()];
    let mut job_ready: Vec<Time> = vec![0.0; jobs.len()];
    let mut cursor: Vec<usize> = vec![0; jobs.len()];
    let mut remaining_work: Vec<Time> = jobs.iter().map(Job::total_work).collect();

    // Jobs with remaining operations, ascending by index.
    let mut active: Vec<usize> = (0..jobs.len()).collect();

    let mut schedule = Schedule::new();
    schedule.operations.reserve(instance.total_operations());

    while !active.is_empty() {
        let mut best: Option<(usize, ReadyOperation<'_>)> = None;
        for (slot, &job) in active.iter().enumerate() {
            let candidate = ready_operation(
                &jobs[job],
                cursor[job],
                job_ready[job],
                remaining_work[job],
                &machine_free,
            );
            let replace = match &best {
                None => true,
                Some((_, current)) => prefer(rule, &candidate, current) == Ordering::Less,
            };
            if replace {
                best = Some((slot, candidate));
            }
        }

        // `active` is non-empty, so a candidate was selected.
        let Some((slot, chosen)) = best else { break };
        let (machine, start) = earliest_machine(
            chosen.eligible_machines(),
            chosen.job_ready_time,
            &machine_free,
        );
        let end = start + chosen.duration();

        debug!(
            rule = rule.rule_name(),
            job = chosen.job,
            operation = chosen.position,
            machine,
            start,
            end,
            "dispatched operation"
        );

        schedule.push(ScheduledOperation::new(chosen.job, chosen.position, machine, start, end));

        let job = chosen.job;
        machine_free[machine] = end;
        job_ready[job] = end;
        remaining_work[job] -= chosen.duration();
        cursor[job] += 1;
        if cursor[job] >= jobs[job].operation_count() {
            active.remove(slot);
        }
    }

    debug!(
        rule = rule.rule_name(),
        operations = schedule.len(),
        makespan = schedule.makespan,
        "schedule complete"
    );

    schedule
}

/// Rule order, then (job index, position) ascending.
fn prefer<R: PriorityRule + ?Sized>(
    rule: &R,
    a: &ReadyOperation<'_>,
    b: &ReadyOperation<'_>,
) -> Ordering {
    rule.compare(a, b)
        .then_with(|| (a.job, a.position).cmp(&(b.job, b.position)))
}

fn ready_operation<'a>(
    job: &'a Job,
    position: usize,
    job_ready_time: Time,
    remaining_work: Time,
    machine_free: &[Time],
) -> ReadyOperation<'a> {
    let operation = &job.operations()[position];
    let (_, earliest_start) =
        earliest_machine(operation.eligible_machines(), job_ready_time, machine_free);
    ReadyOperation {
        job: job.index(),
        position,
        operation,
        job_ready_time,
        earliest_start,
        remaining_work,
        remaining_operations: job.operation_count() - position,
    }
}

/// Eligible machine with the earliest feasible start; lowest id on ties.
///
/// `eligible` is non-empty and ascending (instance invariant).
fn earliest_machine(
    eligible: &[MachineId],
    job_ready_time: Time,
    machine_free: &[Time],
) -> (MachineId, Time) {
    let mut best = (eligible[0], job_ready_time.max(machine_free[eligible[0]]));
    for &machine in &eligible[1..] {
        let start = job_ready_time.max(machine_free[machine]);
        if start < best.1 {
            best = (machine, start);
        }
    }
    best
}

/// Greedy dispatch scheduler bound to a priority rule.
///
/// Defaults to shortest processing time.
///
/// # Example
///
/// ```
/// use u_flexshop::dispatching::rules;
/// use u_flexshop::models::{Instance, Job, Operation};
/// use u_flexshop::scheduler::DispatchScheduler;
///
/// let instance = Instance::new(
///     1,
///     vec![
///         Job::from_operations([Operation::new(4.0, [0])]),
///         Job::from_operations([Operation::new(2.0, [0])]),
///     ],
/// )
/// .unwrap();
///
/// let scheduler = DispatchScheduler::new().with_rule(rules::Lpt);
/// let schedule = scheduler.schedule(&instance);
/// assert_eq!(schedule.get(0, 0).unwrap().start, 0.0);
/// ```
#[derive(Clone)]
pub struct DispatchScheduler {
    rule: Arc<dyn PriorityRule>,
}

impl DispatchScheduler {
    /// Creates a scheduler using SPT.
    pub fn new() -> Self {
        Self {
            rule: Arc::new(rules::Spt),
        }
    }

    /// Replaces the priority rule.
    pub fn with_rule<R: PriorityRule + 'static>(mut self, rule: R) -> Self {
        self.rule = Arc::new(rule);
        self
    }

    /// Replaces the priority rule with an already shared one.
    pub fn with_shared_rule(mut self, rule: Arc<dyn PriorityRule>) -> Self {
        self.rule = rule;
        self
    }

    /// Name of the active rule.
    pub fn rule_name(&self) -> &str {
        self.rule.rule_name()
    }

    /// Schedules an instance.
    pub fn schedule(&self, instance: &Instance) -> Schedule {
        schedule(instance, self.rule.as_ref())
    }
}

impl Default for DispatchScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DispatchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchScheduler")
            .field("rule", &self.rule.rule_name())
            .finish()
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::dispatching::RuleEngine;
    use crate::models::Operation;
    use crate::validation::validate;
    use proptest::prelude::*;

    fn arb_instance() -> impl Strategy<Value = Instance> {
        (1usize..5).prop_flat_map(|num_machines| {
            let op = (
                0.5f64..50.0,
                prop::collection::btree_set(0..num_machines, 1..=num_machines),
            );
            prop::collection::vec(prop::collection::vec(op, 1..5), 0..7).prop_map(move |jobs| {
                let jobs = jobs
                    .into_iter()
                    .map(|ops| {
                        Job::from_operations(
                            ops.into_iter().map(|(d, machines)| Operation::new(d, machines)),
                        )
                    })
                    .collect();
                Instance::new(num_machines, jobs).unwrap()
            })
        })
    }

    fn all_rules() -> Vec<Arc<dyn PriorityRule>> {
        vec![
            Arc::new(rules::Spt),
            Arc::new(rules::Lpt),
            Arc::new(rules::Mwkr),
            Arc::new(rules::Lwkr),
            Arc::new(rules::Mopnr),
            Arc::new(rules::LeastFlex),
            Arc::new(rules::Est),
            Arc::new(RuleEngine::new().with_rule(rules::Est).with_tie_breaker(rules::Spt)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_one_placement_per_operation(inst in arb_instance()) {
            let s = schedule(&inst, &rules::Spt);
            prop_assert_eq!(s.len(), inst.total_operations());
            for (job, op) in inst.operations() {
                prop_assert!(s.get(job, op.position()).is_some());
            }
        }

        #[test]
        fn prop_every_rule_yields_valid_schedule(inst in arb_instance()) {
            for rule in all_rules() {
                let s = schedule(&inst, rule.as_ref());
                let report = validate(&inst, &s);
                prop_assert!(report.is_valid, "{}: {:?}", rule.rule_name(), report.violations);
                prop_assert!(report.makespan_matches(s.makespan));
            }
        }

        #[test]
        fn prop_assigned_machine_is_eligible(inst in arb_instance()) {
            let s = schedule(&inst, &rules::Spt);
            for placed in &s.operations {
                let op = inst.operation(placed.job, placed.operation).unwrap();
                prop_assert!(op.is_eligible(placed.machine));
            }
        }

        #[test]
        fn prop_deterministic(inst in arb_instance()) {
            let a = schedule(&inst, &rules::Spt);
            let b = schedule(&inst, &rules::Spt);
            prop_assert_eq!(
                serde_json::to_string(&a).unwrap(),
                serde_json::to_string(&b).unwrap()
            );
        }

        #[test]
        fn prop_makespan_respects_lower_bounds(inst in arb_instance()) {
            let s = schedule(&inst, &rules::Spt);
            let tol = 1e-6;
            prop_assert!(s.makespan + tol >= inst.job_work_bound());
            prop_assert!(s.makespan + tol >= inst.dedicated_machine_bound());
            prop_assert!(s.makespan + tol >= inst.makespan_lower_bound());
        }
    }
}
