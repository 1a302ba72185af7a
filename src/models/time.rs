//! Time representation and tolerant comparisons.
//!
//! Durations are real-valued (the generator draws them uniformly), so
//! equality and ordering checks on accumulated times go through a relative
//! tolerance instead of exact float comparison.

/// A point in time or a duration, in abstract time units from t=0.
pub type Time = f64;

/// Machine identifier in `[0, num_machines)`.
pub type MachineId = usize;

/// Relative tolerance for time comparisons.
pub const TIME_EPSILON: f64 = 1e-9;

#[inline]
fn tolerance(a: Time, b: Time) -> f64 {
    TIME_EPSILON * 1.0_f64.max(a.abs()).max(b.abs())
}

/// `a == b` within tolerance.
#[inline]
pub fn approx_eq(a: Time, b: Time) -> bool {
    (a - b).abs() <= tolerance(a, b)
}

/// `a < b` by more than the tolerance.
#[inline]
pub fn definitely_less(a: Time, b: Time) -> bool {
    b - a > tolerance(a, b)
}
