//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Time-based**: SPT, LPT
//! - **Work content**: MWKR, LWKR, MOPNR
//! - **Routing**: LEAST_FLEX, EST
//!
//! # Score Convention
//! All rules return lower scores for operations that should go first.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use super::{DispatchingRule, ReadyOperation, RuleScore};

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// Dispatches the ready operation with the smallest duration first.
/// This is the reference rule for the greedy scheduler.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, candidate: &ReadyOperation<'_>) -> RuleScore {
        candidate.duration()
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}

/// Longest Processing Time.
///
/// Useful for load balancing in parallel machine environments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lpt;

impl DispatchingRule for Lpt {
    fn name(&self) -> &'static str {
        "LPT"
    }

    fn evaluate(&self, candidate: &ReadyOperation<'_>) -> RuleScore {
        -candidate.duration()
    }

    fn description(&self) -> &'static str {
        "Longest Processing Time"
    }
}

// ======================== Work-content rules ========================

/// Most Work Remaining.
///
/// Favors jobs with the most remaining processing, which tends to shorten
/// the makespan by starting long chains early.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mwkr;

impl DispatchingRule for Mwkr {
    fn name(&self) -> &'static str {
        "MWKR"
    }

    fn evaluate(&self, candidate: &ReadyOperation<'_>) -> RuleScore {
        -candidate.remaining_work
    }

    fn description(&self) -> &'static str {
        "Most Work Remaining"
    }
}

/// Least Work Remaining.
///
/// Favors jobs close to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lwkr;

impl DispatchingRule for Lwkr {
    fn name(&self) -> &'static str {
        "LWKR"
    }

    fn evaluate(&self, candidate: &ReadyOperation<'_>) -> RuleScore {
        candidate.remaining_work
    }

    fn description(&self) -> &'static str {
        "Least Work Remaining"
    }
}

/// Most Operations Remaining.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mopnr;

impl DispatchingRule for Mopnr {
    fn name(&self) -> &'static str {
        "MOPNR"
    }

    fn evaluate(&self, candidate: &ReadyOperation<'_>) -> RuleScore {
        -(candidate.remaining_operations as f64)
    }

    fn description(&self) -> &'static str {
        "Most Operations Remaining"
    }
}

// ======================== Routing rules ========================

/// Least Flexibility.
///
/// Dispatches operations with the fewest eligible machines first, before
/// their few machines fill up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastFlex;

impl DispatchingRule for LeastFlex {
    fn name(&self) -> &'static str {
        "LEAST_FLEX"
    }

    fn evaluate(&self, candidate: &ReadyOperation<'_>) -> RuleScore {
        candidate.flexibility() as f64
    }

    fn description(&self) -> &'static str {
        "Least Flexibility"
    }
}

/// Earliest Start Time.
///
/// Dispatches the operation that can start soonest on any eligible machine,
/// which keeps machines from idling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Est;

impl DispatchingRule for Est {
    fn name(&self) -> &'static str {
        "EST"
    }

    fn evaluate(&self, candidate: &ReadyOperation<'_>) -> RuleScore {
        candidate.earliest_start
    }

    fn description(&self) -> &'static str {
        "Earliest Start Time"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operation;

    fn ready<'a>(
        op: &'a Operation,
        job: usize,
        earliest_start: f64,
        remaining_work: f64,
        remaining_operations: usize,
    ) -> ReadyOperation<'a> {
        ReadyOperation {
            job,
            position: 0,
            operation: op,
            job_ready_time: 0.0,
            earliest_start,
            remaining_work,
            remaining_operations,
        }
    }

    #[test]
    fn test_spt() {
        let short = Operation::new(2.0, [0]);
        let long = Operation::new(9.0, [0]);
        let a = ready(&short, 0, 0.0, 2.0, 1);
        let b = ready(&long, 1, 0.0, 9.0, 1);
        assert!(Spt.evaluate(&a) < Spt.evaluate(&b));
    }

    #[test]
    fn test_lpt() {
        let short = Operation::new(2.0, [0]);
        let long = Operation::new(9.0, [0]);
        let a = ready(&short, 0, 0.0, 2.0, 1);
        let b = ready(&long, 1, 0.0, 9.0, 1);
        assert!(Lpt.evaluate(&b) < Lpt.evaluate(&a));
    }

    #[test]
    fn test_work_remaining() {
        let op = Operation::new(1.0, [0]);
        let little = ready(&op, 0, 0.0, 3.0, 2);
        let lots = ready(&op, 1, 0.0, 30.0, 5);
        assert!(Mwkr.evaluate(&lots) < Mwkr.evaluate(&little));
        assert!(Lwkr.evaluate(&little) < Lwkr.evaluate(&lots));
        assert!(Mopnr.evaluate(&lots) < Mopnr.evaluate(&little));
    }

    #[test]
    fn test_least_flex() {
        let pinned = Operation::new(5.0, [2]);
        let open = Operation::new(5.0, [0, 1, 2]);
        let a = ready(&pinned, 0, 0.0, 5.0, 1);
        let b = ready(&open, 1, 0.0, 5.0, 1);
        assert!(LeastFlex.evaluate(&a) < LeastFlex.evaluate(&b));
    }

    #[test]
    fn test_est() {
        let op = Operation::new(5.0, [0]);
        let soon = ready(&op, 0, 1.0, 5.0, 1);
        let later = ready(&op, 1, 7.0, 5.0, 1);
        assert!(Est.evaluate(&soon) < Est.evaluate(&later));
    }

    #[test]
    fn test_names() {
        assert_eq!(Spt.name(), "SPT");
        assert_eq!(Spt.description(), "Shortest Processing Time");
        assert_eq!(LeastFlex.name(), "LEAST_FLEX");
    }
}
