//! Persisted instance layout.
//!
//! Mirrors the `instances.json` format produced by the experiment harness:
//!
//! ```json
//! {
//!   "seed": 42, "num_jobs": 1, "num_machines": 2,
//!   "jobs": [{ "job_id": 0, "operations": [
//!     { "operation_id": 0, "eligible_machines": [0, 1],
//!       "processing_times": { "0": 12.5, "1": 12.5 } }
//!   ]}]
//! }
//! ```
//!
//! Durations are stored per eligible machine for compatibility, but must
//! agree across machines.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::time::approx_eq;
use super::{Instance, Job, MachineId, Operation, Time};
use crate::error::MalformedInstance;

/// Serialized form of an [`Instance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub num_jobs: usize,
    pub num_machines: usize,
    pub jobs: Vec<JobRecord>,
}

/// Serialized form of a [`Job`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: usize,
    pub operations: Vec<OperationRecord>,
}

/// Serialized form of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation_id: usize,
    pub eligible_machines: Vec<MachineId>,
    /// Duration keyed by machine id; keyed by exactly the eligible machines,
    /// all values equal.
    pub processing_times: BTreeMap<MachineId, Time>,
}

impl OperationRecord {
    fn duration(&self, job: usize) -> Result<Time, MalformedInstance> {
        // An empty eligible set is reported by `Instance::new`.
        let eligible: BTreeSet<MachineId> = self.eligible_machines.iter().copied().collect();
        if !eligible.is_empty() && !eligible.iter().eq(self.processing_times.keys()) {
            return Err(MalformedInstance::InconsistentRecord(format!(
                "operation {} of job {job} lists eligible machines {:?} but processing times for {:?}",
                self.operation_id,
                eligible,
                self.processing_times.keys().collect::<Vec<_>>()
            )));
        }
        let mut times = self.processing_times.values().copied();
        let first = times.next().ok_or_else(|| {
            MalformedInstance::InconsistentRecord(format!(
                "operation {} of job {job} has no processing time",
                self.operation_id
            ))
        })?;
        if times.any(|t| !approx_eq(t, first)) {
            return Err(MalformedInstance::InconsistentRecord(format!(
                "operation {} of job {job} has machine-dependent processing times",
                self.operation_id
            )));
        }
        Ok(first)
    }
}

impl TryFrom<InstanceRecord> for Instance {
    type Error = MalformedInstance;

    fn try_from(record: InstanceRecord) -> Result<Self, Self::Error> {
        if record.num_jobs != record.jobs.len() {
            return Err(MalformedInstance::InconsistentRecord(format!(
                "num_jobs is {} but {} jobs are listed",
                record.num_jobs,
                record.jobs.len()
            )));
        }

        let mut jobs = Vec::with_capacity(record.jobs.len());
        for (idx, job_rec) in record.jobs.into_iter().enumerate() {
            if job_rec.job_id != idx {
                return Err(MalformedInstance::InconsistentRecord(format!(
                    "job at position {idx} has job_id {}",
                    job_rec.job_id
                )));
            }
            let mut job = Job::new();
            for (pos, op_rec) in job_rec.operations.into_iter().enumerate() {
                if op_rec.operation_id != pos {
                    return Err(MalformedInstance::InconsistentRecord(format!(
                        "operation at position {pos} of job {idx} has operation_id {}",
                        op_rec.operation_id
                    )));
                }
                let duration = op_rec.duration(idx)?;
                job = job.with_operation(Operation::new(duration, op_rec.eligible_machines));
            }
            jobs.push(job);
        }

        let instance = Instance::new(record.num_machines, jobs)?;
        Ok(match record.seed {
            Some(seed) => instance.with_seed(seed),
            None => instance,
        })
    }
}

impl From<Instance> for InstanceRecord {
    fn from(instance: Instance) -> Self {
        let jobs = instance
            .jobs
            .iter()
            .map(|job| JobRecord {
                job_id: job.index,
                operations: job
                    .operations
                    .iter()
                    .map(|op| OperationRecord {
                        operation_id: op.position,
                        eligible_machines: op.eligible_machines.clone(),
                        processing_times: op
                            .eligible_machines
                            .iter()
                            .map(|&m| (m, op.duration))
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            seed: instance.seed,
            num_jobs: instance.jobs.len(),
            num_machines: instance.num_machines,
            jobs,
        }
    }
}
