//! Top-level Iterated Local Search driver. Grounded verbatim on
//! `original_source/pyvrp/IteratedLocalSearch.py`. The outer loop replaces
//! the teacher's `GeneticAlgorithm`/`Population`-based state machine
//! entirely: there is no population, only a single working solution plus
//! the best one seen so far.

use instant::Instant;

use crate::models::FloatType;
use crate::solver::cost_evaluator::CostEvaluator;
use crate::solver::penalty_manager::ConstraintKind;
use crate::solver::perturbation::{broken_pairs_distance, ConvergenceManager, DestroyRepair};
use crate::solver::solution::Solution;
use crate::solver::statistics::{SolveResult, Statistics};
use crate::solver::stop::StoppingCriterion;
use crate::solver::improvement::LocalSearch;
use crate::solver::Context;

#[derive(Debug, Clone, Copy)]
pub struct IteratedLocalSearchParams {
    pub num_iters_no_improvement: u64,
    pub initial_accept_weight: FloatType,
    pub history_length: usize,
    pub budget: u64,
}

impl Default for IteratedLocalSearchParams {
    fn default() -> Self {
        Self {
            num_iters_no_improvement: 20_000,
            initial_accept_weight: 1.0,
            history_length: 500,
            budget: 20_000,
        }
    }
}

/// Circular buffer of recent candidate penalized costs. Deliberately
/// separate storage from `PenaltyManager`'s feasibility history (see
/// SPEC_FULL's note that the two histories serve unrelated purposes and
/// must not share storage).
struct History {
    slots: Vec<Option<FloatType>>,
    idx: usize,
}

impl History {
    fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size.max(1)],
            idx: 0,
        }
    }

    fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.idx = 0;
    }

    fn append(&mut self, value: FloatType) {
        let size = self.slots.len();
        self.slots[self.idx % size] = Some(value);
        self.idx += 1;
    }

    fn min(&self) -> FloatType {
        self.slots
            .iter()
            .filter_map(|v| *v)
            .fold(FloatType::INFINITY, f64::min)
    }

    fn mean(&self) -> FloatType {
        let values: Vec<FloatType> = self.slots.iter().filter_map(|v| *v).collect();
        values.iter().sum::<FloatType>() / values.len() as FloatType
    }
}

/// Composes the perturbation engine and `LocalSearch` into the single
/// `search_method(current, cost_eval) -> candidate` step the ILS loop
/// calls each iteration.
pub struct PerturbedLocalSearch {
    pub destroy_repair: DestroyRepair,
    pub local_search: LocalSearch,
    pub convergence: ConvergenceManager,
}

impl PerturbedLocalSearch {
    pub fn new(destroy_repair: DestroyRepair, local_search: LocalSearch, convergence: ConvergenceManager) -> Self {
        Self {
            destroy_repair,
            local_search,
            convergence,
        }
    }

    pub fn search(&mut self, ctx: &Context, current: &Solution, cost_eval: &CostEvaluator) -> Solution {
        let num_removals = self.convergence.num_removals();
        let destroyed = self.destroy_repair.perturb(
            &ctx.problem,
            cost_eval,
            current,
            &ctx.random,
            &ctx.neighborhood,
            num_removals,
        );
        let candidate = self.local_search.run(ctx, &destroyed);
        self.convergence
            .register(broken_pairs_distance(current, &candidate));
        candidate
    }
}

fn constraint_feasible(solution: &Solution, kind: ConstraintKind) -> bool {
    solution.routes.iter().all(|r| match kind {
        ConstraintKind::Load => r.stats.excess_load == 0,
        ConstraintKind::TimeWarp => r.stats.time_warp == 0,
        ConstraintKind::Distance => r.stats.excess_distance == 0,
    })
}

pub struct IteratedLocalSearch {
    params: IteratedLocalSearchParams,
}

impl IteratedLocalSearch {
    pub fn new(params: IteratedLocalSearchParams) -> Self {
        Self { params }
    }

    /// Runs the ILS loop until `stop` signals termination, starting from
    /// `initial`. Owns none of its collaborators: `ctx` supplies the
    /// problem data, RNG and penalty manager; `search_method` performs the
    /// perturb+search step each iteration.
    pub fn run(
        &self,
        ctx: &Context,
        initial: Solution,
        search_method: &mut PerturbedLocalSearch,
        stop: &mut dyn StoppingCriterion,
        collect_stats: bool,
    ) -> SolveResult {
        let mut history = History::new(self.params.history_length);
        let mut statistics = Statistics::new(collect_stats);

        let start = Instant::now();
        let mut iters: u64 = 0;
        let mut iters_no_improvement: u64 = 0;
        let mut iters_budget: u64 = 0;

        let mut best = initial.clone();
        let mut current = initial;

        let mut cost_eval = ctx.penalty_manager.borrow().evaluator;

        while !stop.call(best.cost(&ctx.problem)) {
            iters += 1;
            iters_no_improvement += 1;
            iters_budget += 1;

            if iters_no_improvement == self.params.num_iters_no_improvement {
                history.clear();
                history.append(best.penalised_cost(&cost_eval, &ctx.problem));
                current = best.clone();
                iters_no_improvement = 0;
            }

            cost_eval = ctx.penalty_manager.borrow().evaluator;
            let candidate = search_method.search(ctx, &current, &cost_eval);

            for kind in [ConstraintKind::Load, ConstraintKind::TimeWarp, ConstraintKind::Distance] {
                ctx.penalty_manager
                    .borrow_mut()
                    .register(kind, constraint_feasible(&candidate, kind));
            }

            if candidate.cost(&ctx.problem) < best.cost(&ctx.problem) {
                best = candidate.clone();
                iters_no_improvement = 0;
            }

            let candidate_cost = candidate.penalised_cost(&cost_eval, &ctx.problem);
            history.append(candidate_cost);

            let mut weight = self.params.initial_accept_weight;
            if let Some(fraction) = stop.fraction_remaining() {
                weight *= fraction;
            }
            weight *= (1.0 - (iters_budget as f64 / self.params.budget as f64)).max(0.0);

            let best_weight = (1.0 - weight) * history.min();
            let mean_weight = weight * history.mean();
            let threshold = best_weight + mean_weight;

            if candidate_cost <= threshold || !best.is_feasible(&ctx.problem) {
                current = candidate.clone();
            }

            if iters_budget >= self.params.budget {
                iters_budget = 0;
            }

            statistics.collect(
                current.penalised_cost(&cost_eval, &ctx.problem),
                current.routes_feasible(),
                candidate_cost,
                candidate.routes_feasible(),
                best.penalised_cost(&cost_eval, &ctx.problem),
                best.is_feasible(&ctx.problem),
                threshold,
            );
        }

        let runtime = start.elapsed().as_secs_f64();
        SolveResult::new(best, statistics, iters, runtime)
    }
}
