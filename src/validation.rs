//! Schedule certification.
//!
//! Checks a schedule against its instance without trusting any bookkeeping
//! of the scheduler that produced it:
//! - Completeness: every operation placed exactly once, nothing extra
//! - Eligibility: assigned machine is in the operation's eligible set
//! - Precedence: a job's operations run in position order without overlap
//! - Duration consistency: `end - start` equals the declared duration
//! - Machine exclusivity: intervals on one machine never overlap
//!   (touching endpoints are fine)
//!
//! Every finding is collected; validation never stops at the first one.
//! The makespan is recomputed from the placements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{
    approx_eq, definitely_less, Instance, MachineId, Schedule, ScheduledOperation, Time,
    Violation, ViolationKind,
};

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `true` iff no violation was found.
    pub is_valid: bool,
    /// Latest end time over all placements, recomputed.
    pub makespan: Time,
    /// Every finding, in check order.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Whether a reported makespan agrees with the recomputed one.
    pub fn makespan_matches(&self, reported: Time) -> bool {
        approx_eq(self.makespan, reported)
    }

    /// Number of findings of one kind.
    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }
}

/// Validates `schedule` against `instance`.
pub fn validate(instance: &Instance, schedule: &Schedule) -> ValidationReport {
    let mut violations = Vec::new();

    check_placements(instance, schedule, &mut violations);
    check_precedence(instance, schedule, &mut violations);
    check_machine_exclusivity(schedule, &mut violations);

    for v in &violations {
        warn!(
            kind = ?v.kind,
            job = ?v.job,
            operation = ?v.operation,
            machine = ?v.machine,
            "{}",
            v.message
        );
    }

    ValidationReport {
        is_valid: violations.is_empty(),
        makespan: schedule.computed_makespan(),
        violations,
    }
}

/// Completeness, eligibility, and duration checks.
fn check_placements(instance: &Instance, schedule: &Schedule, out: &mut Vec<Violation>) {
    let mut placed: BTreeMap<(usize, usize), usize> = BTreeMap::new();

    for s in &schedule.operations {
        let Some(op) = instance.operation(s.job, s.operation) else {
            out.push(
                Violation::for_operation(
                    ViolationKind::UnknownOperation,
                    s.job,
                    s.operation,
                    format!(
                        "operation {} of job {} does not exist in the instance",
                        s.operation, s.job
                    ),
                )
                .on_machine(s.machine),
            );
            continue;
        };

        *placed.entry(s.key()).or_insert(0) += 1;

        if !op.is_eligible(s.machine) {
            out.push(
                Violation::for_operation(
                    ViolationKind::IneligibleMachine,
                    s.job,
                    s.operation,
                    format!(
                        "operation {} of job {} assigned to machine {}, eligible: {:?}",
                        s.operation,
                        s.job,
                        s.machine,
                        op.eligible_machines()
                    ),
                )
                .on_machine(s.machine),
            );
        }

        if !approx_eq(s.duration(), op.duration()) {
            out.push(Violation::for_operation(
                ViolationKind::DurationMismatch,
                s.job,
                s.operation,
                format!(
                    "operation {} of job {} spans {} but its duration is {}",
                    s.operation,
                    s.job,
                    s.duration(),
                    op.duration()
                ),
            ));
        }
    }

    for (job, op) in instance.operations() {
        match placed.get(&(job, op.position())).copied().unwrap_or(0) {
            0 => out.push(Violation::for_operation(
                ViolationKind::MissingOperation,
                job,
                op.position(),
                format!("operation {} of job {job} is not scheduled", op.position()),
            )),
            1 => {}
            n => out.push(Violation::for_operation(
                ViolationKind::DuplicateOperation,
                job,
                op.position(),
                format!("operation {} of job {job} is scheduled {n} times", op.position()),
            )),
        }
    }
}

/// Within each job, consecutive placed operations must not overlap.
fn check_precedence(instance: &Instance, schedule: &Schedule, out: &mut Vec<Violation>) {
    for (job, job_ops) in instance.jobs().iter().enumerate() {
        let mut ops = schedule.operations_for_job(job);
        // Unknown positions and duplicates are reported elsewhere; keep the
        // first placement of each real position.
        ops.retain(|s| s.operation < job_ops.operation_count());
        ops.dedup_by_key(|s| s.operation);

        for pair in ops.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if definitely_less(next.start, prev.start) {
                out.push(Violation::for_operation(
                    ViolationKind::PrecedenceViolation,
                    job,
                    next.operation,
                    format!(
                        "operation {} of job {job} starts at {} before operation {} starts at {}",
                        next.operation, next.start, prev.operation, prev.start
                    ),
                ));
            } else if definitely_less(next.start, prev.end) {
                out.push(Violation::for_operation(
                    ViolationKind::PrecedenceViolation,
                    job,
                    next.operation,
                    format!(
                        "operation {} of job {job} starts at {} before operation {} ends at {}",
                        next.operation, next.start, prev.operation, prev.end
                    ),
                ));
            }
        }
    }
}

/// Per machine, no two intervals may overlap in their interiors.
fn check_machine_exclusivity(schedule: &Schedule, out: &mut Vec<Violation>) {
    let mut by_machine: BTreeMap<MachineId, Vec<&ScheduledOperation>> = BTreeMap::new();
    for s in &schedule.operations {
        by_machine.entry(s.machine).or_default().push(s);
    }

    for (machine, mut ops) in by_machine {
        ops.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));

        // Placement with the latest end seen so far.
        let mut holder: Option<&ScheduledOperation> = None;
        for &cur in &ops {
            if let Some(h) = holder {
                if definitely_less(cur.start, h.end) {
                    out.push(Violation::for_machine(
                        ViolationKind::MachineOverlap,
                        machine,
                        format!(
                            "machine {machine}: job {} op {} [{}, {}) overlaps job {} op {} [{}, {})",
                            h.job, h.operation, h.start, h.end, cur.job, cur.operation, cur.start, cur.end
                        ),
                    ));
                }
                if cur.end > h.end {
                    holder = Some(cur);
                }
            } else {
                holder = Some(cur);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, Operation};

    /// 2 machines; job 0: (3 on {0,1}), (5 on {0,1}); job 1: (2 on {1}).
    fn sample_instance() -> Instance {
        Instance::new(
            2,
            vec![
                Job::from_operations([Operation::new(3.0, [0, 1]), Operation::new(5.0, [0, 1])]),
                Job::from_operations([Operation::new(2.0, [1])]),
            ],
        )
        .unwrap()
    }

    fn valid_schedule() -> Schedule {
        let mut s = Schedule::new();
        s.push(ScheduledOperation::new(0, 0, 0, 0.0, 3.0));
        s.push(ScheduledOperation::new(1, 0, 1, 0.0, 2.0));
        s.push(ScheduledOperation::new(0, 1, 0, 3.0, 8.0));
        s
    }

    #[test]
    fn test_valid_schedule() {
        let report = validate(&sample_instance(), &valid_schedule());
        assert!(report.is_valid, "{:?}", report.violations);
        assert!((report.makespan - 8.0).abs() < 1e-10);
        assert!(report.makespan_matches(8.0));
    }

    #[test]
    fn test_touching_intervals_allowed() {
        let mut s = Schedule::new();
        s.push(ScheduledOperation::new(0, 0, 1, 0.0, 3.0));
        s.push(ScheduledOperation::new(1, 0, 1, 3.0, 5.0));
        s.push(ScheduledOperation::new(0, 1, 1, 5.0, 10.0));
        let report = validate(&sample_instance(), &s);
        assert!(report.is_valid, "{:?}", report.violations);
    }

    #[test]
    fn test_missing_operation() {
        let mut s = valid_schedule();
        s.operations.pop();
        let report = validate(&sample_instance(), &s);
        assert!(!report.is_valid);
        assert_eq!(report.count(ViolationKind::MissingOperation), 1);
        let v = &report.violations[0];
        assert_eq!((v.job, v.operation), (Some(0), Some(1)));
    }

    #[test]
    fn test_duplicate_operation() {
        let mut s = valid_schedule();
        s.push(ScheduledOperation::new(1, 0, 1, 10.0, 12.0));
        let report = validate(&sample_instance(), &s);
        assert_eq!(report.count(ViolationKind::DuplicateOperation), 1);
    }

    #[test]
    fn test_unknown_operation() {
        let mut s = valid_schedule();
        s.push(ScheduledOperation::new(1, 5, 0, 20.0, 21.0));
        s.push(ScheduledOperation::new(7, 0, 0, 30.0, 31.0));
        let report = validate(&sample_instance(), &s);
        assert_eq!(report.count(ViolationKind::UnknownOperation), 2);
    }

    #[test]
    fn test_unknown_position_not_a_precedence_violation() {
        let mut s = valid_schedule();
        // Job 0 has no operation 5; placed before its real operations end.
        s.push(ScheduledOperation::new(0, 5, 1, 2.0, 3.0));
        let report = validate(&sample_instance(), &s);
        assert_eq!(report.count(ViolationKind::UnknownOperation), 1);
        assert_eq!(report.count(ViolationKind::PrecedenceViolation), 0);
    }

    #[test]
    fn test_ineligible_machine() {
        let mut s = valid_schedule();
        // Job 1 may only run on machine 1.
        s.operations[1] = ScheduledOperation::new(1, 0, 0, 8.0, 10.0);
        let report = validate(&sample_instance(), &s);
        assert_eq!(report.count(ViolationKind::IneligibleMachine), 1);
        let v = report
            .violations
            .iter()
            .find(|v| v.kind == ViolationKind::IneligibleMachine)
            .unwrap();
        assert_eq!(v.machine, Some(0));
    }

    #[test]
    fn test_precedence_violation() {
        let mut s = Schedule::new();
        s.push(ScheduledOperation::new(0, 0, 0, 0.0, 3.0));
        s.push(ScheduledOperation::new(0, 1, 1, 2.0, 7.0)); // starts before op 0 ends
        s.push(ScheduledOperation::new(1, 0, 1, 7.0, 9.0));
        let report = validate(&sample_instance(), &s);
        assert_eq!(report.count(ViolationKind::PrecedenceViolation), 1);
        assert_eq!(report.count(ViolationKind::MachineOverlap), 0);
    }

    #[test]
    fn test_reversed_job_order() {
        let mut s = Schedule::new();
        s.push(ScheduledOperation::new(0, 1, 0, 0.0, 5.0));
        s.push(ScheduledOperation::new(0, 0, 1, 5.0, 8.0));
        s.push(ScheduledOperation::new(1, 0, 1, 8.0, 10.0));
        let report = validate(&sample_instance(), &s);
        assert_eq!(report.count(ViolationKind::PrecedenceViolation), 1);
        assert!(report.violations[0].message.contains("before operation 0 starts"));
    }

    #[test]
    fn test_duration_mismatch() {
        let mut s = valid_schedule();
        s.operations[2].end = 9.0;
        let report = validate(&sample_instance(), &s);
        assert_eq!(report.count(ViolationKind::DurationMismatch), 1);
        // Recomputed from placements, not the reported field.
        assert!((report.makespan - 9.0).abs() < 1e-10);
        assert!(!report.makespan_matches(s.makespan));
    }

    #[test]
    fn test_machine_overlap() {
        let mut s = Schedule::new();
        s.push(ScheduledOperation::new(0, 0, 1, 0.0, 3.0));
        s.push(ScheduledOperation::new(1, 0, 1, 1.0, 3.0));
        s.push(ScheduledOperation::new(0, 1, 0, 3.0, 8.0));
        let report = validate(&sample_instance(), &s);
        assert_eq!(report.count(ViolationKind::MachineOverlap), 1);
        let v = &report.violations[0];
        assert_eq!(v.machine, Some(1));
    }

    #[test]
    fn test_nested_overlap_detected() {
        // A long interval swallowing two short ones: both overlaps reported.
        let inst = Instance::new(
            1,
            vec![
                Job::from_operations([Operation::new(10.0, [0])]),
                Job::from_operations([Operation::new(1.0, [0])]),
                Job::from_operations([Operation::new(1.0, [0])]),
            ],
        )
        .unwrap();
        let mut s = Schedule::new();
        s.push(ScheduledOperation::new(0, 0, 0, 0.0, 10.0));
        s.push(ScheduledOperation::new(1, 0, 0, 2.0, 3.0));
        s.push(ScheduledOperation::new(2, 0, 0, 5.0, 6.0));
        let report = validate(&inst, &s);
        assert_eq!(report.count(ViolationKind::MachineOverlap), 2);
    }

    #[test]
    fn test_all_findings_collected() {
        let mut s = Schedule::new();
        s.push(ScheduledOperation::new(0, 0, 0, 0.0, 4.0)); // wrong duration
        s.push(ScheduledOperation::new(1, 0, 0, 1.0, 3.0)); // ineligible + overlap
        let report = validate(&sample_instance(), &s);
        assert!(!report.is_valid);
        assert_eq!(report.count(ViolationKind::DurationMismatch), 1);
        assert_eq!(report.count(ViolationKind::IneligibleMachine), 1);
        assert_eq!(report.count(ViolationKind::MissingOperation), 1);
        assert_eq!(report.count(ViolationKind::MachineOverlap), 1);
    }

    #[test]
    fn test_float_rounding_tolerated() {
        let inst = Instance::new(
            1,
            vec![Job::from_operations([Operation::new(0.1, [0]), Operation::new(0.2, [0])])],
        )
        .unwrap();
        let mut s = Schedule::new();
        s.push(ScheduledOperation::new(0, 0, 0, 0.0, 0.1));
        s.push(ScheduledOperation::new(0, 1, 0, 0.1, 0.1 + 0.2));
        let report = validate(&inst, &s);
        assert!(report.is_valid, "{:?}", report.violations);
    }

    #[test]
    fn test_empty() {
        let inst = Instance::new(1, Vec::new()).unwrap();
        let report = validate(&inst, &Schedule::new());
        assert!(report.is_valid);
        assert!((report.makespan - 0.0).abs() < 1e-10);
    }
}
