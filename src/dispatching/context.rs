//! Ready-set candidate passed to priority rules.

use crate::models::{MachineId, Operation, Time};

/// A frontier operation as seen by a priority rule.
///
/// One exists per job with remaining operations. All values reflect the
/// scheduler state at the moment of selection.
#[derive(Debug, Clone, Copy)]
pub struct ReadyOperation<'a> {
    /// Job index.
    pub job: usize,
    /// Position of this operation within its job.
    pub position: usize,
    /// The operation itself.
    pub operation: &'a Operation,
    /// Completion time of the job's previous operation (0 for the first).
    pub job_ready_time: Time,
    /// Earliest feasible start over the eligible machines.
    pub earliest_start: Time,
    /// Work left in the job, this operation included.
    pub remaining_work: Time,
    /// Operations left in the job, this operation included.
    pub remaining_operations: usize,
}

impl ReadyOperation<'_> {
    /// Processing duration.
    #[inline]
    pub fn duration(&self) -> Time {
        self.operation.duration()
    }

    /// Eligible machine ids, ascending.
    #[inline]
    pub fn eligible_machines(&self) -> &[MachineId] {
        self.operation.eligible_machines()
    }

    /// Number of eligible machines.
    #[inline]
    pub fn flexibility(&self) -> usize {
        self.operation.flexibility()
    }
}
