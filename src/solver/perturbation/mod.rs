//! Destroy/repair perturbation used by the ILS driver to escape local
//! optima between `LocalSearch` calls. Grounded on
//! `original_source/pyvrp/destroy/*.py` and
//! `original_source/pyvrp/ConvergenceManager.py`; the teacher's own
//! perturbation mechanism (`improvement::ruin_recreate`, a simulated-
//! annealing inner loop coupled to its genetic population) is not reused
//! as-is since SPEC_FULL's perturbation contract is a single destroy+repair
//! call, not an inner metaheuristic.

mod destroy;
pub use self::destroy::*;

mod repair;
pub use self::repair::*;

mod convergence;
pub use self::convergence::*;

mod destroy_repair;
pub use self::destroy_repair::*;

use crate::models::{IntType, ProblemData};
use crate::solver::solution::RouteStats;

/// Recomputes a route's cached aggregates from scratch given its vehicle
/// type and ordered client visits. Shared by the destroy operators (to
/// refresh the routes they leave behind) and the repair operators (to
/// price candidate insertions). Mirrors the sequential time/load sweep in
/// `LocalSearch::update_route`, without the pointer-linked bookkeeping
/// that driver needs for incremental moves.
pub fn evaluate_route(data: &ProblemData, vehicle_type: usize, visits: &[usize]) -> RouteStats {
    let vt = data.vehicle_type(vehicle_type);
    let profile = vt.profile;

    if visits.is_empty() {
        return RouteStats::default();
    }

    let mut distance: IntType = 0;
    let mut duration: f64 = 0.0;
    let mut time_warp: f64 = 0.0;
    let mut load: IntType = 0;
    let mut current_time = vt.tw_early as f64;

    let mut prev = vt.start_depot;
    for &node in visits.iter() {
        distance += data.distance(profile, prev, node);
        let travel = data.duration(profile, prev, node) as f64;
        let loc = data.location(node);

        let arrival = (current_time + travel).max(loc.release_time as f64);
        let wait = (loc.tw_early as f64 - arrival).max(0.0);
        let warp = (arrival - loc.tw_late as f64).max(0.0);
        current_time = (arrival + wait - warp).max(loc.tw_early as f64);
        current_time += loc.service_duration as f64;

        duration += travel + wait + loc.service_duration as f64;
        time_warp += warp;
        load += loc.demand;

        prev = node;
    }
    distance += data.distance(profile, prev, vt.end_depot);
    let travel = data.duration(profile, prev, vt.end_depot) as f64;
    duration += travel;
    current_time += travel;
    let warp = (current_time - vt.tw_late as f64).max(0.0);
    time_warp += warp;

    RouteStats {
        distance,
        duration: duration as IntType,
        time_warp: time_warp as IntType,
        excess_load: (load - vt.capacity).max(0),
        excess_distance: (distance - vt.max_distance).max(0),
        start_time: vt.tw_early,
        end_time: current_time as IntType,
    }
}
