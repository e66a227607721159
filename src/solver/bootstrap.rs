//! Wires a `ProblemData` + `Config` pair into a ready-to-run `Context` and
//! `PerturbedLocalSearch`. Shared by the top-level CLI entry point and by
//! fleet-size minimization, which both need to spin up a fresh solve (the
//! latter once per trial fleet). Kept separate from `ils.rs` so the ILS
//! driver itself stays agnostic of how its collaborators were assembled.

use crate::config::Config;
use crate::models::ProblemData;
use crate::solver::cost_evaluator::CostEvaluator;
use crate::solver::ils::PerturbedLocalSearch;
use crate::solver::improvement::LocalSearch;
use crate::solver::neighborhood::{compute_neighbours, NeighborhoodParams};
use crate::solver::penalty_manager::{PenaltyManager, PenaltyManagerParams};
use crate::solver::perturbation::{ConvergenceManager, ConvergenceManagerParams, DestroyRepair, GreedyRepair, NeighborRemoval};
use crate::solver::solution::Solution;
use crate::solver::Context;

pub fn build(data: ProblemData, config: Config) -> (Context, PerturbedLocalSearch, Solution) {
    let cost_eval = CostEvaluator::new(config.penalty_load, config.penalty_time_warp, config.penalty_distance);
    let penalty_params = PenaltyManagerParams {
        feasibility_proportion_target: config.penalty_feasibility_target,
        tolerance_band: config.penalty_tolerance_band,
        increase_multiplier: config.penalty_inc_multiplier,
        decrease_multiplier: config.penalty_dec_multiplier,
        history_length: config.penalty_history_length,
    };
    let penalty_manager = PenaltyManager::new(cost_eval, penalty_params);

    let neighborhood_params = NeighborhoodParams {
        weight_wait_time: config.neighbourhood_weight_wait_time,
        weight_time_warp: config.neighbourhood_weight_time_warp,
        num_granular: config.neighbourhood_size,
        symmetric_proximity: config.neighbourhood_symmetric_proximity,
        symmetric_neighbours: config.neighbourhood_symmetric_neighbours,
    };
    let neighborhood = compute_neighbours(&data, 0, &neighborhood_params);

    let initial = Solution {
        routes: Vec::new(),
        unassigned: (data.num_depots()..data.num_locations()).collect(),
    };

    let ctx = Context::new(data, config.clone(), penalty_manager, neighborhood);
    let local_search = LocalSearch::new(&ctx);

    let convergence = ConvergenceManager::new(ConvergenceManagerParams {
        num_removals_min: config.destroy_num_min,
        num_removals_max: config.destroy_num_max,
        target_pairs_min: config.convergence_target_pairs_min,
        target_pairs_max: config.convergence_target_pairs_max,
        step_increase: config.convergence_penalty_increase,
        step_decrease: config.convergence_penalty_decrease,
        solutions_between_updates: config.convergence_solutions_between_updates,
    });
    let destroy_repair = DestroyRepair::new(Box::new(NeighborRemoval), Some(Box::new(GreedyRepair)));
    let search_method = PerturbedLocalSearch::new(destroy_repair, local_search, convergence);

    (ctx, search_method, initial)
}
