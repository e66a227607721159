//! Repair operators: complete a partial solution by reinserting its
//! unassigned clients. Grounded on the teacher's
//! `improvement::ruin_recreate::recreate::GreedyBlink`, simplified to the
//! spec's deterministic cheapest-feasible-first rule (no blinking/
//! randomized acceptance of a non-cheapest slot).

use crate::models::ProblemData;
use crate::solver::cost_evaluator::CostEvaluator;
use crate::solver::perturbation::evaluate_route;
use crate::solver::solution::{Route, Solution};

pub trait RepairOperator {
    fn name(&self) -> &'static str;

    fn repair(&self, data: &ProblemData, evaluator: &CostEvaluator, solution: &Solution) -> Solution;
}

/// Cost of inserting `client` at every position of `visits`, returning the
/// best (position, delta stats, penalized cost) triple.
fn best_insertion(
    data: &ProblemData,
    evaluator: &CostEvaluator,
    vehicle_type: usize,
    visits: &[usize],
    client: usize,
) -> (usize, f64) {
    let vt = data.vehicle_type(vehicle_type);
    let mut best_pos = visits.len();
    let mut best_cost = f64::INFINITY;

    for pos in 0..=visits.len() {
        let mut trial: Vec<usize> = Vec::with_capacity(visits.len() + 1);
        trial.extend_from_slice(&visits[..pos]);
        trial.push(client);
        trial.extend_from_slice(&visits[pos..]);
        let stats = evaluate_route(data, vehicle_type, &trial);
        let cost = evaluator.penalised_cost(
            stats.distance,
            vt.fixed_cost,
            stats.excess_load,
            stats.time_warp,
            stats.excess_distance,
        );
        if cost < best_cost {
            best_cost = cost;
            best_pos = pos;
        }
    }
    (best_pos, best_cost)
}

/// Greedily inserts every unassigned client at its cheapest feasible
/// position across all open routes and one fresh empty route per unused
/// vehicle type, ties broken by lowest client index (stable iteration
/// order). Required clients in mutually-exclusive groups are inserted the
/// same way as any other client; group exclusivity is enforced upstream by
/// never presenting more than one group member as unassigned at once.
pub struct GreedyRepair;

impl RepairOperator for GreedyRepair {
    fn name(&self) -> &'static str {
        "GreedyRepair"
    }

    fn repair(&self, data: &ProblemData, evaluator: &CostEvaluator, solution: &Solution) -> Solution {
        let mut routes = solution.routes.clone();
        let mut unassigned = solution.unassigned.clone();
        unassigned.sort_unstable();

        let mut still_unassigned = Vec::new();

        for client in unassigned {
            let mut best: Option<(usize, usize, f64)> = None;

            for (r_idx, route) in routes.iter().enumerate() {
                let (pos, cost) = best_insertion(data, evaluator, route.vehicle_type, &route.visits, client);
                if best.map_or(true, |(_, _, c)| cost < c) {
                    best = Some((r_idx, pos, cost));
                }
            }

            let mut spare_routes: Vec<usize> = Vec::new();
            for (vt_idx, vt) in data.vehicle_types().iter().enumerate() {
                let assigned_count = routes.iter().filter(|r| r.vehicle_type == vt_idx && !r.is_empty()).count();
                let empty_count = routes.iter().filter(|r| r.vehicle_type == vt_idx && r.is_empty()).count();
                if assigned_count + empty_count < vt.num_available && empty_count == 0 {
                    spare_routes.push(vt_idx);
                }
            }
            for vt_idx in spare_routes {
                let r_idx = routes.len();
                routes.push(Route {
                    vehicle_type: vt_idx,
                    visits: Vec::new(),
                    stats: Default::default(),
                });
                let (pos, cost) = best_insertion(data, evaluator, vt_idx, &[], client);
                if best.map_or(true, |(_, _, c)| cost < c) {
                    best = Some((r_idx, pos, cost));
                }
            }

            match best {
                Some((r_idx, pos, _)) => {
                    routes[r_idx].visits.insert(pos, client);
                    routes[r_idx].stats =
                        evaluate_route(data, routes[r_idx].vehicle_type, &routes[r_idx].visits);
                }
                None => still_unassigned.push(client),
            }
        }

        routes.retain(|r| !r.is_empty());

        Solution {
            routes,
            unassigned: still_unassigned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Location, Matrix, ProblemDataBuilder, VehicleType};

    fn client(x: i64) -> Location {
        Location {
            coord: Coordinate { x, y: 0 },
            demand: 1,
            pickup: 0,
            service_duration: 0,
            tw_early: 0,
            tw_late: 1000,
            release_time: 0,
            prize: 0,
            required: true,
            group: None,
        }
    }

    fn line_instance(num_clients: i64, num_available: usize) -> ProblemData {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 1000));
        for i in 1..=num_clients {
            builder.add_client(client(i));
        }
        let size = (num_clients + 1) as usize;
        let mut distance = Matrix::new(size, size);
        let mut duration = Matrix::new(size, size);
        for i in 0..size {
            for j in 0..size {
                if i != j {
                    let d = (i as i64 - j as i64).abs();
                    distance.set(i, j, d);
                    duration.set(i, j, d);
                }
            }
        }
        builder.add_profile(distance, duration);
        builder.add_vehicle_type(VehicleType {
            name: None,
            num_available,
            capacity: 100,
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
        });
        builder.build().unwrap()
    }

    #[test]
    fn inserts_lone_client_into_a_fresh_route() {
        let data = line_instance(1, 1);
        let evaluator = CostEvaluator::default();
        let solution = Solution {
            routes: vec![],
            unassigned: vec![1],
        };

        let repaired = GreedyRepair.repair(&data, &evaluator, &solution);

        assert!(repaired.unassigned.is_empty());
        assert_eq!(repaired.routes.len(), 1);
        assert_eq!(repaired.routes[0].visits, vec![1]);
    }

    #[test]
    fn inserts_into_cheapest_position_of_an_existing_route() {
        // Clients at x = 1, 2, 3; an existing route visits [1, 3], and
        // client 2 (index 2, at x=2) should slot in between them.
        let data = line_instance(3, 1);
        let evaluator = CostEvaluator::default();
        let solution = Solution {
            routes: vec![Route {
                vehicle_type: 0,
                visits: vec![1, 3],
                stats: evaluate_route(&data, 0, &[1, 3]),
            }],
            unassigned: vec![2],
        };

        let repaired = GreedyRepair.repair(&data, &evaluator, &solution);

        assert!(repaired.unassigned.is_empty());
        assert_eq!(repaired.routes.len(), 1);
        assert_eq!(repaired.routes[0].visits, vec![1, 2, 3]);
    }

    #[test]
    fn inserts_into_the_only_route_when_no_spare_vehicle_exists() {
        // Single vehicle type, one already in use: GreedyRepair has no
        // spare route to offer and must fold the new client into the
        // existing one rather than leaving it unassigned (it doesn't
        // consider capacity when picking among candidate positions -- that
        // is priced in via `penalised_cost` and corrected by LocalSearch).
        let data = line_instance(2, 1);
        let evaluator = CostEvaluator::default();
        let solution = Solution {
            routes: vec![Route {
                vehicle_type: 0,
                visits: vec![1],
                stats: evaluate_route(&data, 0, &[1]),
            }],
            unassigned: vec![2],
        };

        let repaired = GreedyRepair.repair(&data, &evaluator, &solution);

        assert!(repaired.unassigned.is_empty());
        assert_eq!(repaired.routes.len(), 1);
        assert_eq!(repaired.routes[0].visits.len(), 2);
    }
}
