//! Fleet-size minimization (spec.md §4.11). Grounded verbatim on
//! `original_source/pyvrp/minimise_fleet.py`: repeatedly shrink the fleet
//! by one vehicle and re-solve with a tight stop criterion, keeping the
//! smaller fleet as long as it stays feasible.

use instant::Instant;

use crate::config::Config;
use crate::models::{ProblemData, VehicleType};
use crate::solver::bootstrap;
use crate::solver::ils::{IteratedLocalSearch, IteratedLocalSearchParams};
use crate::solver::solution::Solution;
use crate::solver::stop::{FirstFeasible, MaxRuntime, MultipleCriteria, StoppingCriterion};

/// Counts, per vehicle type, how many non-empty routes of that type a
/// solution uses.
fn used_per_type(solution: &Solution, data: &ProblemData) -> Vec<usize> {
    let mut used = vec![0usize; data.vehicle_types().len()];
    for route in solution.routes.iter().filter(|r| !r.is_empty()) {
        used[route.vehicle_type] += 1;
    }
    used
}

/// Picks the vehicle type to shrink: the one with the largest current
/// surplus (`num_available - used`), ties broken by the highest type
/// index. This is an explicit resolution of `minimise_fleet.py`'s
/// unresolved "which type?" choice -- see DESIGN.md -- that prefers
/// shrinking underused types first and is fully deterministic given the
/// current fleet and usage counts.
fn pick_decrement(vehicle_types: &[VehicleType], used: &[usize]) -> Option<usize> {
    vehicle_types
        .iter()
        .zip(used.iter())
        .enumerate()
        .filter(|(_, (vt, _))| vt.num_available > 0)
        .map(|(idx, (vt, &used))| (idx, vt.num_available as i64 - used as i64))
        .max_by_key(|&(idx, surplus)| (surplus, idx as i64))
        .map(|(idx, _)| idx)
}

/// Builds a trial fleet with one fewer vehicle of `drop_type`, collapsing
/// any vehicle type left with zero vehicles out of the list entirely.
fn decrement_fleet(vehicle_types: &[VehicleType], drop_type: usize) -> Vec<VehicleType> {
    vehicle_types
        .iter()
        .enumerate()
        .filter_map(|(idx, vt)| {
            let mut vt = vt.clone();
            if idx == drop_type {
                vt.num_available -= 1;
                if vt.num_available == 0 {
                    return None;
                }
            }
            Some(vt)
        })
        .collect()
}

/// Runs the fleet-minimization loop (spec.md §4.11) starting from
/// `data`/`config` and an already-feasible `initial` solution. Returns
/// the smallest fleet (and its re-solved solution) still reached within
/// `overall_runtime` seconds that stays feasible, or `(data, initial)`
/// unchanged if no smaller fleet could be found feasible in time.
pub fn minimise_fleet(
    data: ProblemData,
    config: Config,
    initial: Solution,
    overall_runtime: f64,
) -> (ProblemData, Solution) {
    let start = Instant::now();

    let mut best_data = data;
    let mut best_solution = initial;

    loop {
        let remaining = overall_runtime - start.elapsed().as_secs_f64();
        if remaining <= 0.0 {
            return (best_data, best_solution);
        }

        let used = used_per_type(&best_solution, &best_data);
        let drop_type = match pick_decrement(best_data.vehicle_types(), &used) {
            Some(idx) => idx,
            None => return (best_data, best_solution),
        };

        let trial_types = decrement_fleet(best_data.vehicle_types(), drop_type);
        if trial_types.is_empty() {
            return (best_data, best_solution);
        }
        let trial_data = best_data.with_vehicle_types(trial_types);

        let (ctx, mut search_method, trial_initial) = bootstrap::build(trial_data.clone(), config.clone());

        let max_runtime = MaxRuntime::new(remaining.max(0.0)).expect("remaining >= 0 by construction");
        let mut stop: Box<dyn StoppingCriterion> = Box::new(
            MultipleCriteria::new(vec![Box::new(max_runtime), Box::new(FirstFeasible)])
                .expect("two criteria is non-empty"),
        );

        let ils = IteratedLocalSearch::new(IteratedLocalSearchParams::default());
        let result = ils.run(&ctx, trial_initial, &mut search_method, stop.as_mut(), false);

        if result.is_feasible(&trial_data) {
            best_data = trial_data;
            best_solution = result.best;
        } else {
            return (best_data, best_solution);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle_type(num_available: usize) -> VehicleType {
        VehicleType {
            name: None,
            num_available,
            capacity: 10,
            start_depot: 0,
            end_depot: 0,
            fixed_cost: 0,
            unit_distance_cost: 1.0,
            unit_duration_cost: 0.0,
            tw_early: 0,
            tw_late: 1000,
            max_duration: 1000,
            max_distance: 1000,
            profile: 0,
        }
    }

    #[test]
    fn pick_decrement_prefers_largest_surplus() {
        let types = vec![vehicle_type(5), vehicle_type(3)];
        let used = vec![2, 3]; // surplus 3 vs 0
        assert_eq!(pick_decrement(&types, &used), Some(0));
    }

    #[test]
    fn pick_decrement_breaks_ties_by_highest_index() {
        let types = vec![vehicle_type(5), vehicle_type(5)];
        let used = vec![2, 2]; // equal surplus of 3
        assert_eq!(pick_decrement(&types, &used), Some(1));
    }

    #[test]
    fn pick_decrement_skips_types_with_no_vehicles() {
        let types = vec![vehicle_type(0), vehicle_type(2)];
        let used = vec![0, 1];
        assert_eq!(pick_decrement(&types, &used), Some(1));
    }

    #[test]
    fn pick_decrement_none_when_fleet_is_empty() {
        let types: Vec<VehicleType> = vec![];
        let used: Vec<usize> = vec![];
        assert_eq!(pick_decrement(&types, &used), None);
    }

    #[test]
    fn decrement_fleet_drops_one_vehicle_from_the_chosen_type() {
        let types = vec![vehicle_type(3), vehicle_type(2)];
        let trial = decrement_fleet(&types, 0);
        assert_eq!(trial.len(), 2);
        assert_eq!(trial[0].num_available, 2);
        assert_eq!(trial[1].num_available, 2);
    }

    #[test]
    fn decrement_fleet_removes_type_that_reaches_zero() {
        let types = vec![vehicle_type(1), vehicle_type(2)];
        let trial = decrement_fleet(&types, 0);
        assert_eq!(trial.len(), 1);
        assert_eq!(trial[0].num_available, 2);
    }
}
