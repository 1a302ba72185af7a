//! Priority rules for selecting the next operation from the ready set.
//!
//! The scheduler is rule-agnostic: the only thing a rule decides is which
//! frontier operation goes next. Two layers are provided:
//!
//! - [`PriorityRule`]: a comparator over [`ReadyOperation`]s. This is what the
//!   scheduler consumes. Any `Fn(&ReadyOperation, &ReadyOperation) -> Ordering`
//!   closure is a `PriorityRule`.
//! - [`DispatchingRule`]: a scored rule (lower score = scheduled first). The
//!   built-ins in [`rules`] are scored rules, and [`RuleEngine`] composes them.
//!
//! Rules only need to order candidates; the scheduler breaks any remaining
//! tie by (job index, position) ascending.
//!
//! # Usage
//!
//! ```
//! use u_flexshop::dispatching::{rules, RuleEngine};
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Spt)
//!     .with_tie_breaker(rules::Mwkr);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::ReadyOperation;
pub use engine::{EvaluationMode, RuleEngine};

use std::cmp::Ordering;
use std::fmt::Debug;


/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (scheduled first).
pub type RuleScore = f64;

/// Comparator deciding which ready operation is dispatched first.
///
/// `Ordering::Less` means `a` goes before `b`. Returning `Equal` defers to the
/// scheduler's deterministic (job index, position) tie-break.
pub trait PriorityRule: Send + Sync {
    /// Compares two candidates from the ready set.
    fn compare(&self, a: &ReadyOperation<'_>, b: &ReadyOperation<'_>) -> Ordering;

    /// Rule name for logs and reports.
    fn rule_name(&self) -> &str {
        "custom"
    }
}

impl<F> PriorityRule for F
where
    F: Fn(&ReadyOperation<'_>, &ReadyOperation<'_>) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &ReadyOperation<'_>, b: &ReadyOperation<'_>) -> Ordering {
        self(a, b)
    }
}

/// A named comparator rule. See [`comparator`].
#[derive(Clone, Copy)]
pub struct Comparator<F> {
    name: &'static str,
    compare: F,
}

/// Wraps a comparison function as a named [`PriorityRule`].
///
/// Also pins the closure's signature so that its reference parameters are
/// accepted for any lifetime.
///
/// ```
/// use u_flexshop::dispatching::{comparator, PriorityRule};
///
/// let fewest_left = comparator("FOPNR", |a, b| a.remaining_operations.cmp(&b.remaining_operations));
/// assert_eq!(fewest_left.rule_name(), "FOPNR");
/// ```
pub fn comparator<F>(name: &'static str, compare: F) -> Comparator<F>
where
    F: Fn(&ReadyOperation<'_>, &ReadyOperation<'_>) -> Ordering + Send + Sync,
{
    Comparator { name, compare }
}

impl<F> PriorityRule for Comparator<F>
where
    F: Fn(&ReadyOperation<'_>, &ReadyOperation<'_>) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &ReadyOperation<'_>, b: &ReadyOperation<'_>) -> Ordering {
        (self.compare)(a, b)
    }

    fn rule_name(&self) -> &str {
        self.name
    }
}

impl<F> Debug for Comparator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator").field("name", &self.name).finish()
    }
}

/// A scored dispatching rule.
///
/// # Score Convention
/// **Lower score = higher priority.**
///
/// # Reference
/// Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SPT").
    fn name(&self) -> &'static str;

    /// Scores a ready operation; lower = dispatched earlier.
    fn evaluate(&self, candidate: &ReadyOperation<'_>) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Compares two scores exactly; only identical scores tie.
pub(crate) fn compare_scores(a: RuleScore, b: RuleScore) -> Ordering {
    a.total_cmp(&b)
}

/// Implements [`PriorityRule`] for scored rules by comparing their scores.
macro_rules! scored_priority_rule {
    ($($rule:ty),* $(,)?) => {
        $(
            impl PriorityRule for $rule {
                fn compare(&self, a: &ReadyOperation<'_>, b: &ReadyOperation<'_>) -> Ordering {
                    compare_scores(
                        DispatchingRule::evaluate(self, a),
                        DispatchingRule::evaluate(self, b),
                    )
                }

                fn rule_name(&self) -> &str {
                    DispatchingRule::name(self)
                }
            }
        )*
    };
}

scored_priority_rule!(
    rules::Spt,
    rules::Lpt,
    rules::Mwkr,
    rules::Lwkr,
    rules::Mopnr,
    rules::LeastFlex,
    rules::Est,
);
