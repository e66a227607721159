//! Adapts the `CostEvaluator` penalty weights to the observed feasibility
//! rate of recent candidate solutions. Grounded on the teacher's
//! `GeneticAlgorithm::update_penalty` (proportional increase/decrease
//! against a feasibility-proportion target, clamped to a fixed band) and
//! `original_source/pyvrp/ConvergenceManager.py`'s clip-based update.

use std::collections::VecDeque;

use crate::constants::{MAX_PENALTY, MIN_PENALTY};
use crate::solver::cost_evaluator::CostEvaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Load,
    TimeWarp,
    Distance,
}

#[derive(Debug, Clone, Copy)]
pub struct PenaltyManagerParams {
    pub feasibility_proportion_target: f64,
    pub tolerance_band: f64,
    pub increase_multiplier: f64,
    pub decrease_multiplier: f64,
    pub history_length: usize,
}

impl Default for PenaltyManagerParams {
    fn default() -> Self {
        Self {
            feasibility_proportion_target: 0.43,
            tolerance_band: 0.05,
            increase_multiplier: 1.2,
            decrease_multiplier: 0.85,
            history_length: 100,
        }
    }
}

/// RAII guard returned by `PenaltyManager::boost`. Restores the prior
/// penalty weights for the scope's duration when dropped, so a caller that
/// wants to temporarily search with stiffer penalties (e.g. a repair pass
/// on a still-infeasible candidate) can never forget to undo it.
pub struct PenaltyBooster<'a> {
    manager: &'a mut PenaltyManager,
    previous: CostEvaluator,
}

impl<'a> Drop for PenaltyBooster<'a> {
    fn drop(&mut self) {
        self.manager.evaluator = self.previous;
    }
}

#[derive(Debug)]
pub struct PenaltyManager {
    pub evaluator: CostEvaluator,
    params: PenaltyManagerParams,
    feasible_history: [VecDeque<bool>; 3],
}

impl PenaltyManager {
    pub fn new(initial: CostEvaluator, params: PenaltyManagerParams) -> Self {
        Self {
            evaluator: initial,
            params,
            feasible_history: [VecDeque::new(), VecDeque::new(), VecDeque::new()],
        }
    }

    fn slot(&mut self, kind: ConstraintKind) -> &mut VecDeque<bool> {
        match kind {
            ConstraintKind::Load => &mut self.feasible_history[0],
            ConstraintKind::TimeWarp => &mut self.feasible_history[1],
            ConstraintKind::Distance => &mut self.feasible_history[2],
        }
    }

    /// Record whether the most recent candidate was feasible with respect
    /// to `kind`, and adapt that kind's penalty weight if enough history
    /// has accumulated.
    pub fn register(&mut self, kind: ConstraintKind, feasible: bool) {
        let history_length = self.params.history_length;
        let history = self.slot(kind);
        history.push_back(feasible);
        if history.len() > history_length {
            history.pop_front();
        }
        if history.len() < history_length {
            return;
        }

        let feasible_fraction =
            history.iter().filter(|&&f| f).count() as f64 / history.len() as f64;
        let target = self.params.feasibility_proportion_target;
        let band = self.params.tolerance_band;

        let weight = match kind {
            ConstraintKind::Load => &mut self.evaluator.load_penalty,
            ConstraintKind::TimeWarp => &mut self.evaluator.tw_penalty,
            ConstraintKind::Distance => &mut self.evaluator.distance_penalty,
        };

        if feasible_fraction < target - band {
            *weight *= self.params.increase_multiplier;
        } else if feasible_fraction > target + band {
            *weight *= self.params.decrease_multiplier;
        }
        *weight = weight.max(MIN_PENALTY).min(MAX_PENALTY);
    }

    /// Temporarily multiply all penalty weights by `factor`. The returned
    /// guard restores the previous weights when dropped.
    pub fn boost(&mut self, factor: f64) -> PenaltyBooster {
        let previous = self.evaluator;
        self.evaluator.load_penalty *= factor;
        self.evaluator.tw_penalty *= factor;
        self.evaluator.distance_penalty *= factor;
        PenaltyBooster {
            manager: self,
            previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(history_length: usize) -> PenaltyManagerParams {
        PenaltyManagerParams {
            feasibility_proportion_target: 0.5,
            tolerance_band: 0.1,
            increase_multiplier: 2.0,
            decrease_multiplier: 0.5,
            history_length,
        }
    }

    #[test]
    fn no_update_before_history_fills() {
        let mut mgr = PenaltyManager::new(CostEvaluator::new(10.0, 10.0, 10.0), params(4));
        mgr.register(ConstraintKind::Load, false);
        mgr.register(ConstraintKind::Load, false);
        assert_eq!(mgr.evaluator.load_penalty, 10.0);
    }

    #[test]
    fn boosts_penalty_when_mostly_infeasible() {
        let mut mgr = PenaltyManager::new(CostEvaluator::new(10.0, 10.0, 10.0), params(4));
        for _ in 0..4 {
            mgr.register(ConstraintKind::Load, false);
        }
        assert_eq!(mgr.evaluator.load_penalty, 20.0);
        // Only the registered kind's weight moves.
        assert_eq!(mgr.evaluator.tw_penalty, 10.0);
        assert_eq!(mgr.evaluator.distance_penalty, 10.0);
    }

    #[test]
    fn decays_penalty_when_mostly_feasible() {
        let mut mgr = PenaltyManager::new(CostEvaluator::new(10.0, 10.0, 10.0), params(4));
        for _ in 0..4 {
            mgr.register(ConstraintKind::TimeWarp, true);
        }
        assert_eq!(mgr.evaluator.tw_penalty, 5.0);
    }

    #[test]
    fn holds_penalty_within_tolerance_band() {
        let mut mgr = PenaltyManager::new(CostEvaluator::new(10.0, 10.0, 10.0), params(4));
        mgr.register(ConstraintKind::Distance, true);
        mgr.register(ConstraintKind::Distance, true);
        mgr.register(ConstraintKind::Distance, false);
        mgr.register(ConstraintKind::Distance, false);
        // Feasible fraction 0.5 is exactly at target, within the band.
        assert_eq!(mgr.evaluator.distance_penalty, 10.0);
    }

    #[test]
    fn clamps_to_min_and_max_penalty() {
        let mut mgr = PenaltyManager::new(CostEvaluator::new(MIN_PENALTY, MAX_PENALTY, 10.0), params(2));
        mgr.register(ConstraintKind::Load, true);
        mgr.register(ConstraintKind::Load, true);
        assert_eq!(mgr.evaluator.load_penalty, MIN_PENALTY);

        mgr.register(ConstraintKind::TimeWarp, false);
        mgr.register(ConstraintKind::TimeWarp, false);
        assert_eq!(mgr.evaluator.tw_penalty, MAX_PENALTY);
    }

    #[test]
    fn booster_scales_weights_and_restores_on_drop() {
        let mut mgr = PenaltyManager::new(CostEvaluator::new(10.0, 20.0, 30.0), params(4));
        {
            let _booster = mgr.boost(2.0);
            // Can't read through the guard directly since it mutably
            // borrows `mgr`; the effect is observed once it is dropped.
        }
        assert_eq!(mgr.evaluator.load_penalty, 10.0);
        assert_eq!(mgr.evaluator.tw_penalty, 20.0);
        assert_eq!(mgr.evaluator.distance_penalty, 30.0);
    }

    #[test]
    fn booster_doubles_while_in_scope() {
        let mut mgr = PenaltyManager::new(CostEvaluator::new(10.0, 20.0, 30.0), params(4));
        let booster = mgr.boost(2.0);
        assert_eq!(booster.manager.evaluator.load_penalty, 20.0);
        assert_eq!(booster.manager.evaluator.tw_penalty, 40.0);
        assert_eq!(booster.manager.evaluator.distance_penalty, 60.0);
    }
}
