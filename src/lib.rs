//! Flexible job shop scheduling with greedy dispatching rules.
//!
//! Every job is a fixed sequence of operations; every operation may run on
//! any machine of its eligible set, for the same duration on each. A
//! schedule places each operation on one machine over a half-open interval
//! and is judged by its makespan.
//!
//! # Modules
//!
//! - **`models`**: `Instance`, `Job`, `Operation`, `Schedule`, and the
//!   persisted `InstanceRecord` format
//! - **`dispatching`**: priority rules (SPT by default) and a rule engine
//! - **`scheduler`**: the non-insertion list scheduler and schedule KPIs
//! - **`validation`**: independent certification of any schedule
//! - **`generator`**: seeded random instances
//! - **`config`**, **`experiment`**, **`results`**: benchmark runs driven by
//!   a JSON configuration and written to disk
//!
//! # Example
//!
//! ```
//! use u_flexshop::models::{Instance, Job, Operation};
//! use u_flexshop::{schedule, validate, dispatching::rules};
//!
//! let instance = Instance::new(
//!     2,
//!     vec![
//!         Job::from_operations([Operation::new(3.0, [0, 1]), Operation::new(2.0, [1])]),
//!         Job::from_operations([Operation::new(1.0, [0])]),
//!     ],
//! )
//! .unwrap();
//!
//! let s = schedule(&instance, &rules::Spt);
//! let report = validate(&instance, &s);
//! assert!(report.is_valid);
//! assert!(report.makespan_matches(s.makespan));
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Brandimarte (1993), "Routing and scheduling in a flexible job shop by tabu search"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod experiment;
pub mod generator;
pub mod models;
pub mod results;
pub mod scheduler;
pub mod validation;

pub use error::{ConfigError, MalformedInstance, ResultsError};
pub use scheduler::{schedule, DispatchScheduler};
pub use validation::{validate, ValidationReport};
