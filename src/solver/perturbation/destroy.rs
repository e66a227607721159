//! Destroy operators: given a solution, remove a handful of clients and
//! hand back the resulting partial solution plus the list of clients now
//! unassigned. Grounded on `original_source/pyvrp/destroy/neighbour.py`
//! (`NeighborRemoval`) and `original_source/pyvrp/destroy/concentric.py`
//! (`Concentric`).

use crate::models::ProblemData;
use crate::solver::perturbation::evaluate_route;
use crate::solver::solution::Solution;
use crate::solver::neighborhood::Neighborhood;
use crate::utils::RandomStream;

pub trait DestroyOperator {
    fn name(&self) -> &'static str;

    /// Removes up to `num_removals` clients from `solution`, returning the
    /// partial solution and the clients taken out. Clients already in
    /// `solution.unassigned` are left untouched; they are the repair
    /// operator's job too, but destroy never needs to re-remove them.
    fn destroy(
        &self,
        data: &ProblemData,
        solution: &Solution,
        random: &RandomStream,
        neighborhood: &Neighborhood,
        num_removals: usize,
    ) -> Solution;
}

/// Finds the route and position of `client` in `solution`, if it is
/// currently assigned to one.
fn locate(solution: &Solution, client: usize) -> Option<(usize, usize)> {
    for (r_idx, route) in solution.routes.iter().enumerate() {
        if let Some(pos) = route.visits.iter().position(|&c| c == client) {
            return Some((r_idx, pos));
        }
    }
    None
}

fn remove_clients(data: &ProblemData, solution: &Solution, removed: &[usize]) -> Solution {
    let mut routes = solution.routes.clone();
    let mut unassigned = solution.unassigned.clone();

    for &client in removed {
        if let Some((r_idx, pos)) = locate(solution, client) {
            routes[r_idx].visits.retain(|&c| c != client);
            let _ = pos;
        }
        unassigned.push(client);
    }

    for route in routes.iter_mut() {
        route.stats = evaluate_route(data, route.vehicle_type, &route.visits);
    }

    Solution { routes, unassigned }
}

/// Picks a random assigned client as a seed, then removes its
/// `num_removals - 1` closest currently-assigned granular neighbours (plus
/// itself), stopping early if the neighbourhood is exhausted.
pub struct NeighborRemoval;

impl DestroyOperator for NeighborRemoval {
    fn name(&self) -> &'static str {
        "NeighborRemoval"
    }

    fn destroy(
        &self,
        data: &ProblemData,
        solution: &Solution,
        random: &RandomStream,
        neighborhood: &Neighborhood,
        num_removals: usize,
    ) -> Solution {
        let assigned: Vec<usize> = solution
            .routes
            .iter()
            .flat_map(|r| r.visits.iter().copied())
            .collect();
        if assigned.is_empty() || num_removals == 0 {
            return solution.clone();
        }

        let seed = assigned[random.range_usize(0, assigned.len())];
        let mut removed = vec![seed];
        let assigned_set: std::collections::HashSet<usize> = assigned.into_iter().collect();

        for &candidate in neighborhood.neighbours(seed) {
            if removed.len() >= num_removals {
                break;
            }
            if assigned_set.contains(&candidate) && !removed.contains(&candidate) {
                removed.push(candidate);
            }
        }

        remove_clients(data, solution, &removed)
    }
}

/// Picks a random seed client and removes the `num_removals` clients
/// closest to it by raw distance (not the asymmetric granular proximity),
/// giving a tighter geographic destroy than `NeighborRemoval`.
pub struct Concentric;

impl DestroyOperator for Concentric {
    fn name(&self) -> &'static str {
        "Concentric"
    }

    fn destroy(
        &self,
        data: &ProblemData,
        solution: &Solution,
        random: &RandomStream,
        _neighborhood: &Neighborhood,
        num_removals: usize,
    ) -> Solution {
        let assigned: Vec<usize> = solution
            .routes
            .iter()
            .flat_map(|r| r.visits.iter().copied())
            .collect();
        if assigned.is_empty() || num_removals == 0 {
            return solution.clone();
        }

        let seed = assigned[random.range_usize(0, assigned.len())];
        let profile = 0;
        let mut by_distance: Vec<(i64, usize)> = assigned
            .iter()
            .filter(|&&c| c != seed)
            .map(|&c| (data.distance(profile, seed, c), c))
            .collect();
        by_distance.sort_by_key(|&(d, _)| d);

        let mut removed = vec![seed];
        removed.extend(
            by_distance
                .into_iter()
                .take(num_removals.saturating_sub(1))
                .map(|(_, c)| c),
        );

        remove_clients(data, solution, &removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Location, Matrix, ProblemDataBuilder, VehicleType};
    use crate::solver::neighborhood::{compute_neighbours, NeighborhoodParams};

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

    fn line_instance(num_clients: i64) -> ProblemData {
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
            num_available: 1,
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
    fn neighbor_removal_is_a_no_op_on_an_empty_solution() {
        let data = line_instance(3);
        let neighborhood = compute_neighbours(&data, 0, &NeighborhoodParams::default());
        let random = crate::utils::RandomStream::from_seed(0);
        let solution = Solution::empty();

        let destroyed = NeighborRemoval.destroy(&data, &solution, &random, &neighborhood, 2);
        assert!(destroyed.routes.is_empty());
        assert!(destroyed.unassigned.is_empty());
    }

    #[test]
    fn neighbor_removal_moves_clients_out_of_their_route() {
        let data = line_instance(4);
        let neighborhood = compute_neighbours(&data, 0, &NeighborhoodParams::default());
        let random = crate::utils::RandomStream::from_seed(0);
        let solution = Solution {
            routes: vec![Route {
                vehicle_type: 0,
                visits: vec![1, 2, 3, 4],
                stats: evaluate_route(&data, 0, &[1, 2, 3, 4]),
            }],
            unassigned: vec![],
        };

        let destroyed = NeighborRemoval.destroy(&data, &solution, &random, &neighborhood, 2);

        let remaining: usize = destroyed.routes.iter().map(|r| r.visits.len()).sum();
        assert_eq!(remaining + destroyed.unassigned.len(), 4);
        assert_eq!(destroyed.unassigned.len(), 2);
        // Removed clients must not also linger in a route.
        for &c in &destroyed.unassigned {
            assert!(destroyed.routes.iter().all(|r| !r.visits.contains(&c)));
        }
    }

    #[test]
    fn concentric_removes_seed_and_its_closest_neighbours() {
        let data = line_instance(4);
        let neighborhood = compute_neighbours(&data, 0, &NeighborhoodParams::default());
        let random = crate::utils::RandomStream::from_seed(1);
        let solution = Solution {
            routes: vec![Route {
                vehicle_type: 0,
                visits: vec![1, 2, 3, 4],
                stats: evaluate_route(&data, 0, &[1, 2, 3, 4]),
            }],
            unassigned: vec![],
        };

        let destroyed = Concentric.destroy(&data, &solution, &random, &neighborhood, 3);
        assert_eq!(destroyed.unassigned.len(), 3);
        let remaining: usize = destroyed.routes.iter().map(|r| r.visits.len()).sum();
        assert_eq!(remaining, 1);
    }

    #[test]
    fn zero_removals_leaves_solution_untouched() {
        let data = line_instance(2);
        let neighborhood = compute_neighbours(&data, 0, &NeighborhoodParams::default());
        let random = crate::utils::RandomStream::from_seed(0);
        let solution = Solution {
            routes: vec![Route {
                vehicle_type: 0,
                visits: vec![1, 2],
                stats: evaluate_route(&data, 0, &[1, 2]),
            }],
            unassigned: vec![],
        };

        let destroyed = NeighborRemoval.destroy(&data, &solution, &random, &neighborhood, 0);
        assert_eq!(destroyed.routes[0].visits, vec![1, 2]);
        assert!(destroyed.unassigned.is_empty());
    }
}
