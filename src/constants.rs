//! Numerical sentinels shared across the solver.

/// Cost value used to mark a forbidden/incompatible edge or assignment.
/// Large enough that it can be summed many times over without overflowing
/// the `i64` domain deltas are computed in, yet still comparable.
pub const MAX_VALUE: i64 = 1 << 52;

/// Tolerance used when comparing floating point costs (penalty weights,
/// acceptance thresholds) for strict improvement.
pub const EPSILON: f64 = 1e-6;

pub const MIN_PENALTY: f64 = 1.0;
pub const MAX_PENALTY: f64 = 1000.0;

/// Sentinel returned by `Solution::cost` for an infeasible solution.
/// Greater than any feasible cost, yet finite so it stays comparable and
/// can still be fed into downstream statistics.
pub const COST_INFEAS: f64 = 1e18;
