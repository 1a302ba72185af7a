//! Greedy dispatch scheduling and KPI evaluation.
//!
//! # Algorithm
//!
//! [`schedule`] is a non-preemptive, non-insertion list scheduler: it
//! repeatedly takes the ready operation preferred by a
//! [`PriorityRule`](crate::dispatching::PriorityRule) and places it on the
//! eligible machine where it can start earliest. It is a polynomial-time
//! heuristic, not an exact solver.
//!
//! # KPI
//!
//! [`ScheduleKpi`] computes makespan, lower-bound gap, utilization, idle time
//! and mean completion time.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod dispatch;
mod kpi;

pub use dispatch::{schedule, DispatchScheduler};
pub use kpi::ScheduleKpi;
