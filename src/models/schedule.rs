//! Schedule (solution) model.
//!
//! A schedule holds one placement per operation: which machine processes it
//! and over which time interval. It also carries the makespan reported by the
//! scheduler that produced it, so the validator's independent recomputation
//! can be diffed against it.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{MachineId, Time};

/// A complete schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Placements in the order they were dispatched.
    pub operations: Vec<ScheduledOperation>,
    /// Makespan as reported by the producing scheduler.
    pub makespan: Time,
}

/// An operation placed on a machine over `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledOperation {
    /// Job index.
    pub job: usize,
    /// Operation position within the job.
    pub operation: usize,
    /// Assigned machine.
    pub machine: MachineId,
    /// Start time.
    pub start: Time,
    /// End time (`start + duration`).
    pub end: Time,
}

impl ScheduledOperation {
    /// Creates a placement.
    pub fn new(job: usize, operation: usize, machine: MachineId, start: Time, end: Time) -> Self {
        Self {
            job,
            operation,
            machine,
            start,
            end,
        }
    }

    /// Interval length (`end - start`).
    #[inline]
    pub fn duration(&self) -> Time {
        self.end - self.start
    }

    /// `(job, operation)` key.
    #[inline]
    pub fn key(&self) -> (usize, usize) {
        (self.job, self.operation)
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a placement and extends the reported makespan.
    pub fn push(&mut self, op: ScheduledOperation) {
        self.makespan = self.makespan.max(op.end);
        self.operations.push(op);
    }

    /// Latest end time across all placements, recomputed from the records.
    pub fn computed_makespan(&self) -> Time {
        self.operations.iter().map(|o| o.end).fold(0.0, f64::max)
    }

    /// Placement for `(job, operation)`, if present.
    pub fn get(&self, job: usize, operation: usize) -> Option<&ScheduledOperation> {
        self.operations
            .iter()
            .find(|o| o.job == job && o.operation == operation)
    }

    /// Placements of one job, ordered by operation position.
    pub fn operations_for_job(&self, job: usize) -> Vec<&ScheduledOperation> {
        let mut ops: Vec<_> = self.operations.iter().filter(|o| o.job == job).collect();
        ops.sort_by_key(|o| o.operation);
        ops
    }

    /// Completion time of a job (latest end of its placements).
    pub fn job_completion_time(&self, job: usize) -> Option<Time> {
        self.operations
            .iter()
            .filter(|o| o.job == job)
            .map(|o| o.end)
            .reduce(f64::max)
    }

    /// Busy time per machine that has at least one placement.
    pub fn machine_busy_time(&self) -> BTreeMap<MachineId, Time> {
        let mut busy = BTreeMap::new();
        for o in &self.operations {
            *busy.entry(o.machine).or_insert(0.0) += o.duration();
        }
        busy
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the schedule has no placements.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// A validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Which check failed.
    pub kind: ViolationKind,
    /// Related job, when the finding concerns one.
    pub job: Option<usize>,
    /// Related operation position, when the finding concerns one.
    pub operation: Option<usize>,
    /// Related machine, when the finding concerns one.
    pub machine: Option<MachineId>,
    /// Human-readable description.
    pub message: String,
}

/// Classification of validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// An instance operation has no placement.
    MissingOperation,
    /// An operation is placed more than once.
    DuplicateOperation,
    /// A placement refers to an operation the instance does not have.
    UnknownOperation,
    /// The assigned machine is not in the operation's eligible set.
    IneligibleMachine,
    /// A job's operations are out of order or overlap.
    PrecedenceViolation,
    /// `end - start` differs from the declared duration.
    DurationMismatch,
    /// Two placements on one machine overlap.
    MachineOverlap,
}

impl Violation {
    fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            job: None,
            operation: None,
            machine: None,
            message: message.into(),
        }
    }

    /// Finding about a specific operation.
    pub fn for_operation(
        kind: ViolationKind,
        job: usize,
        operation: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            job: Some(job),
            operation: Some(operation),
            ..Self::new(kind, message)
        }
    }

    /// Finding about a machine.
    pub fn for_machine(kind: ViolationKind, machine: MachineId, message: impl Into<String>) -> Self {
        Self {
            machine: Some(machine),
            ..Self::new(kind, message)
        }
    }

    /// Attaches a machine id.
    pub fn on_machine(mut self, machine: MachineId) -> Self {
        self.machine = Some(machine);
        self
    }
}
