//! Rule engine for multi-criteria dispatching.
//!
//! Composes scored dispatching rules with configurable evaluation modes.
//! The engine itself is a [`PriorityRule`], so it plugs straight into the
//! scheduler.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{compare_scores, DispatchingRule, PriorityRule, ReadyOperation, RuleScore};

/// How multiple rules are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    #[default]
    Sequential,
    /// Compare the weighted sum of all rule scores.
    Weighted,
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn DispatchingRule>,
    weight: f64,
}

/// A composable rule engine for operation prioritization.
///
/// # Example
/// ```
/// use u_flexshop::dispatching::{rules, PriorityRule, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Spt)
///     .with_tie_breaker(rules::Mwkr);
/// assert_eq!(engine.rule_name(), "SPT>MWKR");
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    name: String,
}

impl RuleEngine {
    /// Creates an empty rule engine. With no rules, every pair ties.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            name: String::new(),
        }
    }

    /// Adds a primary rule (weight 1.0).
    pub fn with_rule<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.push(Arc::new(rule), 1.0)
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: DispatchingRule + 'static>(self, rule: R, weight: f64) -> Self {
        self.push(Arc::new(rule), weight)
    }

    /// Adds a tie-breaking rule (weight 0.0, only consulted in Sequential mode).
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.push(Arc::new(rule), 0.0)
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    fn push(mut self, rule: Arc<dyn DispatchingRule>, weight: f64) -> Self {
        if !self.name.is_empty() {
            self.name.push('>');
        }
        self.name.push_str(rule.name());
        self.rules.push(WeightedRule { rule, weight });
        self
    }

    /// Number of composed rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are composed.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Weighted scores of each rule for one candidate.
    pub fn evaluate(&self, candidate: &ReadyOperation<'_>) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(candidate) * wr.weight)
            .collect()
    }

    fn compare_sequential(&self, a: &ReadyOperation<'_>, b: &ReadyOperation<'_>) -> Ordering {
        self.rules
            .iter()
            .map(|wr| compare_scores(wr.rule.evaluate(a), wr.rule.evaluate(b)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    fn weighted_score(&self, candidate: &ReadyOperation<'_>) -> RuleScore {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(candidate) * wr.weight)
            .sum()
    }
}

impl PriorityRule for RuleEngine {
    fn compare(&self, a: &ReadyOperation<'_>, b: &ReadyOperation<'_>) -> Ordering {
        match self.mode {
            EvaluationMode::Sequential => self.compare_sequential(a, b),
            EvaluationMode::Weighted => compare_scores(self.weighted_score(a), self.weighted_score(b)),
        }
    }

    fn rule_name(&self) -> &str {
        if self.name.is_empty() {
            "EMPTY"
        } else {
            &self.name
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .finish()
    }
}
