//! Error types.
//!
//! Only structural problems are errors. Schedule defects found by the
//! validator are collected as [`Violation`](crate::models::Violation)s and
//! never surface through `Result`.

use thiserror::Error;

use crate::models::{MachineId, Time};

/// Structural violation of the instance invariants, raised at construction.
///
/// Fatal to the offending instance only; an instance that fails to build
/// never reaches the scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedInstance {
    /// The instance declares zero machines.
    #[error("instance has no machines")]
    NoMachines,

    /// A job has no operations.
    #[error("job {job} has no operations")]
    EmptyJob { job: usize },

    /// An operation has an empty eligible-machine set.
    #[error("operation {operation} of job {job} has no eligible machines")]
    EmptyEligibleSet { job: usize, operation: usize },

    /// An eligible machine id lies outside `[0, num_machines)`.
    #[error(
        "operation {operation} of job {job} references machine {machine}, \
         but the instance has {num_machines} machines"
    )]
    MachineOutOfRange {
        job: usize,
        operation: usize,
        machine: MachineId,
        num_machines: usize,
    },

    /// A duration is zero, negative, or not finite.
    #[error("operation {operation} of job {job} has invalid duration {duration}")]
    InvalidDuration {
        job: usize,
        operation: usize,
        duration: Time,
    },

    /// A persisted record disagrees with itself (counts, ids, durations).
    #[error("inconsistent instance record: {0}")]
    InconsistentRecord(String),
}

/// Invalid generator or experiment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A `[min, max]` range is empty or out of its domain.
    #[error("invalid range for {name}: [{min}, {max}]")]
    InvalidRange { name: &'static str, min: f64, max: f64 },

    /// A scalar parameter is out of its domain.
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("generated instance is malformed: {0}")]
    Instance(#[from] MalformedInstance),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure while persisting experiment results.
#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
