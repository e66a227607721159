//! Composable stop criteria, polled once per ILS iteration against the
//! current best cost. Grounded verbatim on
//! `original_source/pyvrp/stop/*.py`.

use instant::Instant;

use crate::constants::{COST_INFEAS, MAX_VALUE};
use crate::errors::VrpError;
use crate::models::FloatType;

pub trait StoppingCriterion {
    /// Called once per iteration with the cost of the current best
    /// solution (`COST_INFEAS` if no feasible solution has been found
    /// yet). Returns `true` once the search should stop.
    fn call(&mut self, best_cost: FloatType) -> bool;

    /// Fraction of the criterion's budget remaining, in `[0, 1]`, or
    /// `None` if this criterion has no notion of a budget (e.g.
    /// `NoImprovement`, `FirstFeasible`, `ReachedBKS`).
    fn fraction_remaining(&self) -> Option<FloatType> {
        None
    }
}

/// Stops after `max_iterations` calls.
pub struct MaxIterations {
    max_iterations: u64,
    current_iteration: u64,
}

impl MaxIterations {
    pub fn new(max_iterations: u64) -> Self {
        Self {
            max_iterations,
            current_iteration: 0,
        }
    }
}

impl StoppingCriterion for MaxIterations {
    fn call(&mut self, _best_cost: FloatType) -> bool {
        self.current_iteration += 1;
        self.current_iteration > self.max_iterations
    }

    fn fraction_remaining(&self) -> Option<FloatType> {
        if self.max_iterations == 0 {
            return Some(0.0);
        }
        let remaining = self.max_iterations.saturating_sub(self.current_iteration);
        Some((remaining as FloatType / self.max_iterations as FloatType).max(0.0))
    }
}

/// Stops once `max_runtime` seconds have elapsed since the first call.
pub struct MaxRuntime {
    max_runtime: f64,
    start: Option<Instant>,
}

impl MaxRuntime {
    pub fn new(max_runtime: f64) -> Result<Self, VrpError> {
        if max_runtime < 0.0 {
            return Err(VrpError::InvalidParameter {
                name: "max_runtime",
                value: max_runtime.to_string(),
                constraint: "must be >= 0",
            });
        }
        Ok(Self {
            max_runtime,
            start: None,
        })
    }
}

impl StoppingCriterion for MaxRuntime {
    fn call(&mut self, _best_cost: FloatType) -> bool {
        let start = *self.start.get_or_insert_with(Instant::now);
        start.elapsed().as_secs_f64() > self.max_runtime
    }

    fn fraction_remaining(&self) -> Option<FloatType> {
        match self.start {
            None => Some(1.0),
            Some(start) => {
                if self.max_runtime == 0.0 {
                    return Some(0.0);
                }
                let elapsed = start.elapsed().as_secs_f64();
                Some((1.0 - elapsed / self.max_runtime).max(0.0))
            }
        }
    }
}

/// Stops after `max_iterations` consecutive calls without a strictly
/// better best cost.
pub struct NoImprovement {
    max_iterations: u64,
    target: Option<FloatType>,
    counter: u64,
}

impl NoImprovement {
    pub fn new(max_iterations: u64) -> Self {
        Self {
            max_iterations,
            target: None,
            counter: 0,
        }
    }
}

impl StoppingCriterion for NoImprovement {
    fn call(&mut self, best_cost: FloatType) -> bool {
        match self.target {
            Some(target) if best_cost < target => {
                self.target = Some(best_cost);
                self.counter = 0;
            }
            None => {
                self.target = Some(best_cost);
                self.counter = 0;
            }
            _ => self.counter += 1,
        }
        self.counter >= self.max_iterations
    }
}

/// Stops the first time a feasible best solution is observed.
pub struct FirstFeasible;

impl StoppingCriterion for FirstFeasible {
    fn call(&mut self, best_cost: FloatType) -> bool {
        best_cost < COST_INFEAS
    }
}

/// Stops once `best_cost <= bks_value`.
pub struct ReachedBKS {
    bks_value: FloatType,
}

impl ReachedBKS {
    pub fn new(bks_value: FloatType) -> Result<Self, VrpError> {
        if bks_value <= 0.0 {
            return Err(VrpError::InvalidParameter {
                name: "bks_value",
                value: bks_value.to_string(),
                constraint: "must be a positive integer",
            });
        }
        if bks_value.fract() != 0.0 || bks_value >= MAX_VALUE as FloatType {
            return Err(VrpError::InvalidParameter {
                name: "bks_value",
                value: bks_value.to_string(),
                constraint: "must be an integer value",
            });
        }
        Ok(Self { bks_value })
    }
}

impl StoppingCriterion for ReachedBKS {
    fn call(&mut self, best_cost: FloatType) -> bool {
        best_cost <= self.bks_value
    }
}

/// Stops as soon as any child criterion stops.
/// `fraction_remaining` reports the minimum of the children that report
/// one at all.
pub struct MultipleCriteria {
    criteria: Vec<Box<dyn StoppingCriterion>>,
}

impl MultipleCriteria {
    pub fn new(criteria: Vec<Box<dyn StoppingCriterion>>) -> Result<Self, VrpError> {
        if criteria.is_empty() {
            return Err(VrpError::InvalidParameter {
                name: "criteria",
                value: "0".to_string(),
                constraint: "expected one or more stopping criteria",
            });
        }
        Ok(Self { criteria })
    }
}

impl StoppingCriterion for MultipleCriteria {
    fn call(&mut self, best_cost: FloatType) -> bool {
        // Evaluate every child regardless of short-circuiting so that each
        // one's internal counters stay in sync across iterations.
        self.criteria
            .iter_mut()
            .map(|c| c.call(best_cost))
            .fold(false, |acc, stopped| acc || stopped)
    }

    fn fraction_remaining(&self) -> Option<FloatType> {
        self.criteria
            .iter()
            .filter_map(|c| c.fraction_remaining())
            .fold(None, |acc, f| match acc {
                None => Some(f),
                Some(current) => Some(current.min(f)),
            })
    }
}
