//! The immutable result type produced by a search pass: a set of routes
//! plus the unassigned clients left over, together with their cached cost
//! aggregates. Separated from the mutable pointer-linked working
//! representation `LocalSearch` operates on (matching PyVRP's `Solution`/
//! `Route` split; the teacher instead tied a mutable `Individual` directly
//! to its genetic-algorithm population).

use crate::models::{FloatType, IntType, ProblemData};
use crate::solver::cost_evaluator::CostEvaluator;

#[derive(Debug, Clone, Default)]
pub struct RouteStats {
    pub distance: IntType,
    pub duration: IntType,
    pub time_warp: IntType,
    pub excess_load: IntType,
    pub excess_distance: IntType,
    pub start_time: IntType,
    pub end_time: IntType,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub vehicle_type: usize,
    pub visits: Vec<usize>,
    pub stats: RouteStats,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    pub fn is_feasible(&self) -> bool {
        self.stats.time_warp == 0 && self.stats.excess_load == 0 && self.stats.excess_distance == 0
    }
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub routes: Vec<Route>,
    pub unassigned: Vec<usize>,
}

impl Solution {
    pub fn empty() -> Self {
        Self {
            routes: Vec::new(),
            unassigned: Vec::new(),
        }
    }

    /// Whether every route is within its capacity/time-warp/distance
    /// limits. Ignores unassigned clients and vehicle-count/group
    /// constraints; see `is_feasible` for the full check.
    pub fn routes_feasible(&self) -> bool {
        self.routes.iter().all(Route::is_feasible)
    }

    /// Full feasibility per spec §3: all route excesses zero, every
    /// required client visited, every mutually-exclusive group satisfied,
    /// and vehicle counts per type within `num_available`.
    pub fn is_feasible(&self, data: &ProblemData) -> bool {
        if !self.routes_feasible() {
            return false;
        }

        let unassigned_required = self
            .unassigned
            .iter()
            .any(|&c| data.location(c).required);
        if unassigned_required {
            return false;
        }

        for group in data.groups() {
            if group.mutually_exclusive {
                let visited = group
                    .members
                    .iter()
                    .filter(|&&m| !self.unassigned.contains(&m))
                    .count();
                if visited > 1 {
                    return false;
                }
            }
        }

        let mut used_per_type = vec![0usize; data.vehicle_types().len()];
        for route in self.routes.iter().filter(|r| !r.is_empty()) {
            used_per_type[route.vehicle_type] += 1;
        }
        for (vt_idx, vt) in data.vehicle_types().iter().enumerate() {
            if used_per_type[vt_idx] > vt.num_available {
                return false;
            }
        }

        true
    }

    pub fn num_routes(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    pub fn distance(&self) -> IntType {
        self.routes.iter().map(|r| r.stats.distance).sum()
    }

    /// Penalized cost used by the search: exact on the feasible subspace,
    /// smoothly worse as constraints (including unassigned clients) are
    /// violated. Unlike `cost`, this is always finite and comparable.
    pub fn penalised_cost(&self, evaluator: &CostEvaluator, data: &ProblemData) -> FloatType {
        self.routes
            .iter()
            .map(|r| {
                let vt = data.vehicle_type(r.vehicle_type);
                let fixed = if r.is_empty() { 0 } else { vt.fixed_cost };
                evaluator.penalised_cost(
                    r.stats.distance,
                    fixed,
                    r.stats.excess_load,
                    r.stats.time_warp,
                    r.stats.excess_distance,
                )
            })
            .sum::<FloatType>()
            + (self.unassigned.len() as FloatType) * evaluator.tw_penalty.max(1.0) * 1000.0
    }

    /// Travel + fixed cost if `self` is feasible, or `COST_INFEAS` (a
    /// sentinel greater than any feasible cost, but still comparable)
    /// otherwise. Matches on the feasible subspace with `penalised_cost`.
    pub fn cost(&self, data: &ProblemData) -> FloatType {
        if !self.is_feasible(data) {
            return crate::constants::COST_INFEAS;
        }
        let travel_cost: FloatType = self
            .routes
            .iter()
            .map(|r| {
                let vt = data.vehicle_type(r.vehicle_type);
                r.stats.distance as FloatType * vt.unit_distance_cost
                    + r.stats.duration as FloatType * vt.unit_duration_cost
                    + vt.fixed_cost as FloatType
            })
            .sum();
        travel_cost - self.prizes_collected(data)
    }

    /// Sum of prizes of all visited clients.
    pub fn prizes_collected(&self, data: &ProblemData) -> FloatType {
        self.routes
            .iter()
            .flat_map(|r| r.visits.iter())
            .map(|&c| data.location(c).prize as FloatType)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientGroup, Coordinate, Location, Matrix, ProblemDataBuilder, VehicleType};

    fn optional_client(prize: IntType, required: bool, group: Option<usize>) -> Location {
        Location {
            coord: Coordinate { x: 1, y: 0 },
            demand: 1,
            pickup: 0,
            service_duration: 0,
            tw_early: 0,
            tw_late: 100,
            release_time: 0,
            prize,
            required,
            group,
        }
    }

    fn vehicle_type(num_available: usize, capacity: IntType) -> VehicleType {
        VehicleType {
            name: None,
            num_available,
            capacity,
            start_depot: 0,
            end_depot: 0,
            fixed_cost: 5,
            unit_distance_cost: 1.0,
            unit_duration_cost: 0.0,
            tw_early: 0,
            tw_late: 1000,
            max_duration: 1000,
            max_distance: 1000,
            profile: 0,
        }
    }

    fn route(vehicle_type: usize, visits: Vec<usize>, stats: RouteStats) -> Route {
        Route {
            vehicle_type,
            visits,
            stats,
        }
    }

    #[test]
    fn empty_solution_is_feasible_and_free() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 100));
        builder.add_profile(Matrix::new(1, 1), Matrix::new(1, 1));
        builder.add_vehicle_type(vehicle_type(1, 10));
        let data = builder.build().unwrap();

        let solution = Solution::empty();
        assert!(solution.is_feasible(&data));
        assert_eq!(solution.cost(&data), 0.0);
        assert_eq!(solution.num_routes(), 0);
    }

    #[test]
    fn route_with_excess_load_is_infeasible() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 100));
        builder.add_client(optional_client(0, true, None));
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        builder.add_vehicle_type(vehicle_type(1, 0));
        let data = builder.build().unwrap();

        let solution = Solution {
            routes: vec![route(
                0,
                vec![1],
                RouteStats {
                    excess_load: 1,
                    ..Default::default()
                },
            )],
            unassigned: vec![],
        };

        assert!(!solution.is_feasible(&data));
        assert_eq!(solution.cost(&data), crate::constants::COST_INFEAS);
    }

    #[test]
    fn unassigned_required_client_is_infeasible() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 100));
        builder.add_client(optional_client(0, true, None));
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        builder.add_vehicle_type(vehicle_type(1, 10));
        let data = builder.build().unwrap();

        let solution = Solution {
            routes: vec![],
            unassigned: vec![1],
        };
        assert!(!solution.is_feasible(&data));
    }

    #[test]
    fn unassigned_optional_client_stays_feasible() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 100));
        builder.add_client(optional_client(0, false, None));
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        builder.add_vehicle_type(vehicle_type(1, 10));
        let data = builder.build().unwrap();

        let solution = Solution {
            routes: vec![],
            unassigned: vec![1],
        };
        assert!(solution.is_feasible(&data));
    }

    #[test]
    fn exclusive_group_rejects_more_than_one_visited_member() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 100));
        builder.add_client(optional_client(1, false, Some(0)));
        builder.add_client(optional_client(1, false, Some(0)));
        let mut distance = Matrix::new(3, 3);
        let mut duration = Matrix::new(3, 3);
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    distance.set(i, j, 1);
                    duration.set(i, j, 1);
                }
            }
        }
        builder.add_profile(distance, duration);
        builder.add_vehicle_type(vehicle_type(1, 10));
        builder.add_group(ClientGroup {
            members: vec![1, 2],
            mutually_exclusive: true,
        });
        let data = builder.build().unwrap();

        let both_visited = Solution {
            routes: vec![route(0, vec![1, 2], RouteStats::default())],
            unassigned: vec![],
        };
        assert!(!both_visited.is_feasible(&data));

        let one_visited = Solution {
            routes: vec![route(0, vec![1], RouteStats::default())],
            unassigned: vec![2],
        };
        assert!(one_visited.is_feasible(&data));
    }

    #[test]
    fn vehicle_count_over_availability_is_infeasible() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 100));
        builder.add_client(optional_client(0, true, None));
        builder.add_client(optional_client(0, true, None));
        let mut distance = Matrix::new(3, 3);
        let mut duration = Matrix::new(3, 3);
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    distance.set(i, j, 1);
                    duration.set(i, j, 1);
                }
            }
        }
        builder.add_profile(distance, duration);
        builder.add_vehicle_type(vehicle_type(1, 10));
        let data = builder.build().unwrap();

        let solution = Solution {
            routes: vec![
                route(0, vec![1], RouteStats::default()),
                route(0, vec![2], RouteStats::default()),
            ],
            unassigned: vec![],
        };
        assert!(!solution.is_feasible(&data));
    }

    #[test]
    fn cost_subtracts_collected_prizes() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 100));
        builder.add_client(optional_client(30, false, None));
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        builder.add_vehicle_type(vehicle_type(1, 10));
        let data = builder.build().unwrap();

        let solution = Solution {
            routes: vec![route(
                0,
                vec![1],
                RouteStats {
                    distance: 20,
                    ..Default::default()
                },
            )],
            unassigned: vec![],
        };

        // fixed_cost (5) + distance (20) - prize (30)
        assert_eq!(solution.cost(&data), -5.0);
        assert_eq!(solution.prizes_collected(&data), 30.0);
    }

    #[test]
    fn penalised_cost_prices_unassigned_clients_even_when_empty() {
        let eval = CostEvaluator::new(1.0, 2.0, 1.0);
        let solution = Solution {
            routes: vec![],
            unassigned: vec![1, 2],
        };
        let data_builder = {
            let mut builder = ProblemDataBuilder::new();
            builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 100));
            builder.add_client(optional_client(0, false, None));
            builder.add_client(optional_client(0, false, None));
            let mut distance = Matrix::new(3, 3);
            let mut duration = Matrix::new(3, 3);
            for i in 0..3 {
                for j in 0..3 {
                    if i != j {
                        distance.set(i, j, 1);
                        duration.set(i, j, 1);
                    }
                }
            }
            builder.add_profile(distance, duration);
            builder.add_vehicle_type(vehicle_type(1, 10));
            builder
        };
        let data = data_builder.build().unwrap();

        let cost = solution.penalised_cost(&eval, &data);
        assert_eq!(cost, 2.0 * eval.tw_penalty.max(1.0) * 1000.0);
    }
}
