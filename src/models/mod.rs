//! Flexible job-shop domain models.
//!
//! Provides the data types for representing problem instances and their
//! schedules. Instances are validated once at construction and read-only
//! afterwards; schedules are produced fresh by each scheduler run.
//!
//! # Domain Mappings
//!
//! | u-flexshop | Manufacturing | Healthcare | Logistics |
//! |------------|--------------|------------|-----------|
//! | Job | Order | Patient Case | Shipment |
//! | Operation | Process Step | Procedure | Transport Leg |
//! | Machine | Machine/Cell | Room | Truck |
//! | Schedule | Production Plan | OR Schedule | Route Plan |

mod instance;
mod job;
mod operation;
mod record;
mod schedule;
mod time;

pub use instance::Instance;
pub use job::Job;
pub use operation::Operation;
pub use record::{InstanceRecord, JobRecord, OperationRecord};
pub use schedule::{Schedule, ScheduledOperation, Violation, ViolationKind};
pub use time::{approx_eq, definitely_less, MachineId, Time, TIME_EPSILON};
