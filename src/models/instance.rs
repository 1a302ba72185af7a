//! Problem instance.
//!
//! An instance is the set of jobs plus the machine count. It is validated
//! once at construction and read-only afterwards. Every accessor can rely on:
//! - at least one machine,
//! - every job has at least one operation,
//! - every operation has a non-empty eligible set within `[0, num_machines)`,
//! - every duration is finite and strictly positive.

use serde::{Deserialize, Serialize};

use super::record::InstanceRecord;
use super::{Job, Operation, Time};
use crate::error::MalformedInstance;

/// A validated flexible job-shop instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstanceRecord", into = "InstanceRecord")]
pub struct Instance {
    pub(crate) jobs: Vec<Job>,
    pub(crate) num_machines: usize,
    pub(crate) seed: Option<u64>,
}

impl Instance {
    /// Builds an instance, assigning job indices by position in `jobs`.
    ///
    /// # Errors
    /// [`MalformedInstance`] on the first structural violation found, scanning
    /// jobs and operations in order.
    pub fn new(num_machines: usize, jobs: Vec<Job>) -> Result<Self, MalformedInstance> {
        if num_machines == 0 {
            return Err(MalformedInstance::NoMachines);
        }

        let mut jobs = jobs;
        for (job_idx, job) in jobs.iter_mut().enumerate() {
            job.index = job_idx;
            if job.operations.is_empty() {
                return Err(MalformedInstance::EmptyJob { job: job_idx });
            }
            for (op_idx, op) in job.operations.iter_mut().enumerate() {
                op.position = op_idx;
                check_operation(op, job_idx, num_machines)?;
            }
        }

        Ok(Self {
            jobs,
            num_machines,
            seed: None,
        })
    }

    /// Tags the instance with the seed it was generated from.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generator seed, if the instance was generated.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Jobs in index order.
    #[inline]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Job by index.
    pub fn job(&self, job: usize) -> Option<&Job> {
        self.jobs.get(job)
    }

    /// Operation by (job index, position).
    pub fn operation(&self, job: usize, position: usize) -> Option<&Operation> {
        self.jobs.get(job).and_then(|j| j.operation(position))
    }

    /// Number of jobs.
    #[inline]
    pub fn num_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Number of machines.
    #[inline]
    pub fn num_machines(&self) -> usize {
        self.num_machines
    }

    /// Total number of operations across all jobs.
    pub fn total_operations(&self) -> usize {
        self.jobs.iter().map(Job::operation_count).sum()
    }

    /// Sum of all operation durations.
    pub fn total_work(&self) -> Time {
        self.jobs.iter().map(Job::total_work).sum()
    }

    /// Iterates `(job index, operation)` over every operation.
    pub fn operations(&self) -> impl Iterator<Item = (usize, &Operation)> {
        self.jobs
            .iter()
            .flat_map(|job| job.operations.iter().map(move |op| (job.index, op)))
    }

    /// Longest job: no schedule finishes before its chain completes.
    pub fn job_work_bound(&self) -> Time {
        self.jobs.iter().map(Job::total_work).fold(0.0, f64::max)
    }

    /// Largest load forced onto a single machine by flexibility-1 operations.
    pub fn dedicated_machine_bound(&self) -> Time {
        let mut load = vec![0.0; self.num_machines];
        for (_, op) in self.operations() {
            if let [machine] = op.eligible_machines() {
                load[*machine] += op.duration;
            }
        }
        load.into_iter().fold(0.0, f64::max)
    }

    /// Total work spread evenly across all machines.
    pub fn average_load_bound(&self) -> Time {
        self.total_work() / self.num_machines as f64
    }

    /// Best available lower bound on the optimal makespan.
    pub fn makespan_lower_bound(&self) -> Time {
        self.job_work_bound()
            .max(self.dedicated_machine_bound())
            .max(self.average_load_bound())
    }

    /// Converts to the persisted record layout.
    pub fn to_record(&self) -> InstanceRecord {
        InstanceRecord::from(self.clone())
    }
}

fn check_operation(
    op: &Operation,
    job: usize,
    num_machines: usize,
) -> Result<(), MalformedInstance> {
    let operation = op.position;

    if !op.duration.is_finite() || op.duration <= 0.0 {
        return Err(MalformedInstance::InvalidDuration {
            job,
            operation,
            duration: op.duration,
        });
    }

    // Sorted ascending, so the last id is the largest.
    match op.eligible_machines.last() {
        None => Err(MalformedInstance::EmptyEligibleSet { job, operation }),
        Some(&machine) if machine >= num_machines => Err(MalformedInstance::MachineOutOfRange {
            job,
            operation,
            machine,
            num_machines,
        }),
        Some(_) => Ok(()),
    }
}
