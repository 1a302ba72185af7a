//! Job model.
//!
//! A job is an ordered chain of operations. Operation `i` must finish before
//! operation `i + 1` of the same job may start.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use super::{Operation, Time};

/// A job: an ordered sequence of operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Job {
    pub(crate) index: usize,
    pub(crate) operations: Vec<Operation>,
}

impl Job {
    /// Creates an empty job. The index is assigned by [`Instance::new`](super::Instance::new).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a job from operations in processing order.
    pub fn from_operations(operations: impl IntoIterator<Item = Operation>) -> Self {
        operations
            .into_iter()
            .fold(Self::new(), |job, op| job.with_operation(op))
    }

    /// Appends an operation; its position is the current operation count.
    pub fn with_operation(mut self, mut operation: Operation) -> Self {
        operation.position = self.operations.len();
        self.operations.push(operation);
        self
    }

    /// Index of this job within its instance.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Operations in processing order.
    #[inline]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Operation at `position`, if any.
    pub fn operation(&self, position: usize) -> Option<&Operation> {
        self.operations.get(position)
    }

    /// Number of operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Sum of operation durations.
    pub fn total_work(&self) -> Time {
        self.operations.iter().map(|op| op.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_builder_assigns_positions() {
        let job = Job::new()
            .with_operation(Operation::new(3.0, [0]))
            .with_operation(Operation::new(5.0, [1]));

        assert_eq!(job.operation_count(), 2);
        assert_eq!(job.operations()[0].position(), 0);
        assert_eq!(job.operations()[1].position(), 1);
    }

    #[test]
    fn test_job_work() {
        let job = Job::from_operations([
            Operation::new(1.0, [0]),
            Operation::new(2.0, [0]),
            Operation::new(4.0, [0]),
        ]);
        assert!((job.total_work() - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_job_empty() {
        let job = Job::new();
        assert_eq!(job.operation_count(), 0);
        assert!(job.operation(0).is_none());
        assert!((job.total_work() - 0.0).abs() < 1e-10);
    }
}
