//! Operation model.
//!
//! An operation is the smallest schedulable unit of work. It belongs to a job,
//! occupies one machine from its eligible set for its whole duration, and may
//! start only after the previous operation of the same job has finished.
//!
//! Machines are homogeneous: the duration does not depend on which eligible
//! machine processes the operation.
//!
//! # Reference
//! Brandimarte (1993), "Routing and scheduling in a flexible job shop by tabu search"

use super::{MachineId, Time};

/// An operation to be scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub(crate) position: usize,
    pub(crate) duration: Time,
    pub(crate) eligible_machines: Vec<MachineId>,
}

impl Operation {
    /// Creates an operation with the given duration and eligible machines.
    ///
    /// The eligible set is stored in ascending id order without duplicates.
    /// The position is assigned when the operation is added to a [`Job`](super::Job).
    pub fn new(duration: Time, eligible_machines: impl IntoIterator<Item = MachineId>) -> Self {
        let mut eligible_machines: Vec<MachineId> = eligible_machines.into_iter().collect();
        eligible_machines.sort_unstable();
        eligible_machines.dedup();
        Self {
            position: 0,
            duration,
            eligible_machines,
        }
    }

    /// Position within the job (0-indexed). Defines precedence order.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Processing duration, identical on every eligible machine.
    #[inline]
    pub fn duration(&self) -> Time {
        self.duration
    }

    /// Eligible machine ids, ascending.
    #[inline]
    pub fn eligible_machines(&self) -> &[MachineId] {
        &self.eligible_machines
    }

    /// Number of eligible machines.
    #[inline]
    pub fn flexibility(&self) -> usize {
        self.eligible_machines.len()
    }

    /// Whether `machine` may process this operation.
    pub fn is_eligible(&self, machine: MachineId) -> bool {
        self.eligible_machines.binary_search(&machine).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_normalises_eligible_set() {
        let op = Operation::new(5.0, [3, 1, 3, 0]);
        assert_eq!(op.eligible_machines(), &[0, 1, 3]);
        assert_eq!(op.flexibility(), 3);
        assert!((op.duration() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_is_eligible() {
        let op = Operation::new(1.0, vec![2, 4]);
        assert!(op.is_eligible(2));
        assert!(op.is_eligible(4));
        assert!(!op.is_eligible(3));
    }

    #[test]
    fn test_empty_eligible_set_is_representable() {
        // Rejected by Instance::new, not here.
        let op = Operation::new(1.0, Vec::new());
        assert_eq!(op.flexibility(), 0);
    }
}
