//! Composes a destroy operator with an optional repair operator into the
//! single perturbation step the ILS driver calls between `LocalSearch`
//! passes.

use crate::models::ProblemData;
use crate::solver::cost_evaluator::CostEvaluator;
use crate::solver::perturbation::{DestroyOperator, RepairOperator};
use crate::solver::solution::Solution;
use crate::solver::neighborhood::Neighborhood;
use crate::utils::RandomStream;

pub struct DestroyRepair {
    pub destroy: Box<dyn DestroyOperator>,
    pub repair: Option<Box<dyn RepairOperator>>,
}

impl DestroyRepair {
    pub fn new(destroy: Box<dyn DestroyOperator>, repair: Option<Box<dyn RepairOperator>>) -> Self {
        Self { destroy, repair }
    }

    /// Runs the destroy step, then the repair step if one is configured.
    /// When `repair` is `None`, the returned `Solution` still carries its
    /// `unassigned` clients; `LocalSearch` is expected to be invoked
    /// immediately afterwards, which reinserts them via its empty-route
    /// and relocate moves.
    pub fn perturb(
        &self,
        data: &ProblemData,
        evaluator: &CostEvaluator,
        solution: &Solution,
        random: &RandomStream,
        neighborhood: &Neighborhood,
        num_removals: usize,
    ) -> Solution {
        let destroyed = self
            .destroy
            .destroy(data, solution, random, neighborhood, num_removals);

        match &self.repair {
            Some(repair) => repair.repair(data, evaluator, &destroyed),
            None => destroyed,
        }
    }
}
