//! End-to-end scenarios from the solver's testable-properties scenario
//! suite: an empty instance, a single-client instance, and an instance with
//! only a partial distance matrix (unspecified edges default to the
//! forbidden-edge sentinel).

use vrp_ils::config::Config;
use vrp_ils::constants::MAX_VALUE;
use vrp_ils::models::{Coordinate, Location, Matrix, ProblemDataBuilder, VehicleType};
use vrp_ils::solver::bootstrap;
use vrp_ils::solver::ils::{IteratedLocalSearch, IteratedLocalSearchParams};
use vrp_ils::solver::stop::MaxIterations;

fn depot() -> Location {
    Location::depot(Coordinate { x: 0, y: 0 }, 0, 1000)
}

fn single_vehicle_type(capacity: i64) -> VehicleType {
    VehicleType {
        name: None,
        num_available: 1,
        capacity,
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

/// Scenario C: an instance with zero clients solves immediately to a
/// feasible, route-less solution.
#[test]
fn empty_instance_solves_to_zero_routes() {
    let mut builder = ProblemDataBuilder::new();
    builder.add_depot(depot());
    builder.add_profile(Matrix::new(1, 1), Matrix::new(1, 1));
    builder.add_vehicle_type(single_vehicle_type(10));
    let data = builder.build().unwrap();

    let mut config = Config::default();
    config.deterministic = true;
    config.seed = 0;

    let (ctx, mut search_method, initial) = bootstrap::build(data.clone(), config);
    let ils = IteratedLocalSearch::new(IteratedLocalSearchParams::default());
    let mut stop = MaxIterations::new(1);

    let result = ils.run(&ctx, initial, &mut search_method, &mut stop, false);

    assert!(result.is_feasible(&data));
    assert_eq!(result.best.num_routes(), 0);
    assert_eq!(result.best.cost(&data), 0.0);
}

/// Scenario D: a single-client instance with zero-distance edges to/from
/// the depot solves to exactly one route visiting that client.
#[test]
fn single_client_instance_solves_to_one_route() {
    let mut builder = ProblemDataBuilder::new();
    builder.add_depot(depot());
    builder.add_client(Location {
        coord: Coordinate { x: 0, y: 0 },
        demand: 1,
        pickup: 0,
        service_duration: 0,
        tw_early: 0,
        tw_late: 1000,
        release_time: 0,
        prize: 0,
        required: true,
        group: None,
    });
    // Zero-distance edges to/from the depot, per the scenario description.
    builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
    builder.add_vehicle_type(single_vehicle_type(10));
    let data = builder.build().unwrap();

    let mut config = Config::default();
    config.deterministic = true;
    config.seed = 0;

    let (ctx, mut search_method, initial) = bootstrap::build(data.clone(), config);
    let ils = IteratedLocalSearch::new(IteratedLocalSearchParams::default());
    let mut stop = MaxIterations::new(5);

    let result = ils.run(&ctx, initial, &mut search_method, &mut stop, false);

    assert!(result.is_feasible(&data));
    assert_eq!(result.best.num_routes(), 1);
    let route = result
        .best
        .routes
        .iter()
        .find(|r| !r.is_empty())
        .expect("exactly one non-empty route");
    assert_eq!(route.visits, vec![1]);
    assert_eq!(result.best.cost(&data), 0.0);
}

/// Scenario E: edges not present in an explicit distance matrix default to
/// the forbidden-edge sentinel `MAX_VALUE`, so a feasible tour can only use
/// the edges that were actually specified.
#[test]
fn unspecified_edges_default_to_the_forbidden_sentinel() {
    let mut builder = ProblemDataBuilder::new();
    builder.add_depot(depot());
    builder.add_client(Location {
        coord: Coordinate { x: 1, y: 0 },
        demand: 1,
        pickup: 0,
        service_duration: 0,
        tw_early: 0,
        tw_late: 1000,
        release_time: 0,
        prize: 0,
        required: true,
        group: None,
    });
    builder.add_client(Location {
        coord: Coordinate { x: 2, y: 0 },
        demand: 1,
        pickup: 0,
        service_duration: 0,
        tw_early: 0,
        tw_late: 1000,
        release_time: 0,
        prize: 0,
        required: true,
        group: None,
    });

    let mut distance = Matrix::new(3, 3);
    let mut duration = Matrix::new(3, 3);
    for i in 0..3 {
        for j in 0..3 {
            if i != j {
                distance.set(i, j, MAX_VALUE);
                duration.set(i, j, MAX_VALUE);
            }
        }
    }
    // Only a single feasible tour is specified: depot -> 1 -> 2 -> depot.
    for &(from, to, cost) in &[(0usize, 1usize, 5i64), (1, 2, 5), (2, 0, 5)] {
        distance.set(from, to, cost);
        duration.set(from, to, cost);
    }
    builder.add_profile(distance, duration);
    builder.add_vehicle_type(single_vehicle_type(10));
    let data = builder.build().unwrap();

    assert_eq!(data.distance(0, 0, 2), MAX_VALUE);
    assert_eq!(data.distance(0, 1, 0), MAX_VALUE);
    assert_eq!(data.distance(0, 0, 1), 5);
    assert_eq!(data.distance(0, 1, 2), 5);
    assert_eq!(data.distance(0, 2, 0), 5);
}

/// Property 1 (partial): every route starts and ends at its vehicle type's
/// depot, and no client appears in more than one route, on a small
/// multi-client instance run through a handful of ILS iterations.
#[test]
fn solved_routes_start_and_end_at_the_assigned_depot() {
    let mut builder = ProblemDataBuilder::new();
    builder.add_depot(depot());
    for i in 1..=5i64 {
        builder.add_client(Location {
            coord: Coordinate { x: i, y: 0 },
            demand: 1,
            pickup: 0,
            service_duration: 0,
            tw_early: 0,
            tw_late: 1000,
            release_time: 0,
            prize: 0,
            required: true,
            group: None,
        });
    }
    let mut distance = Matrix::new(6, 6);
    let mut duration = Matrix::new(6, 6);
    for i in 0..6 {
        for j in 0..6 {
            if i != j {
                let d = (i as i64 - j as i64).abs();
                distance.set(i, j, d);
                duration.set(i, j, d);
            }
        }
    }
    builder.add_profile(distance, duration);
    builder.add_vehicle_type(single_vehicle_type(2));
    builder.add_vehicle_type(single_vehicle_type(2));
    builder.add_vehicle_type(single_vehicle_type(2));
    let data = builder.build().unwrap();

    let mut config = Config::default();
    config.deterministic = true;
    config.seed = 42;

    let (ctx, mut search_method, initial) = bootstrap::build(data.clone(), config);
    let ils = IteratedLocalSearch::new(IteratedLocalSearchParams::default());
    let mut stop = MaxIterations::new(20);

    let result = ils.run(&ctx, initial, &mut search_method, &mut stop, false);

    let mut seen = std::collections::HashSet::new();
    for route in result.best.routes.iter().filter(|r| !r.is_empty()) {
        let vt = data.vehicle_type(route.vehicle_type);
        assert_eq!(vt.start_depot, 0);
        assert_eq!(vt.end_depot, 0);
        for &client in route.visits.iter() {
            assert!(data.is_depot(client) == false);
            assert!(seen.insert(client), "client {} visited twice", client);
        }
    }
}
