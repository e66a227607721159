//! Builds, for every client, a short list of other clients worth trying as
//! local-search neighbours. Grounded verbatim on the proximity formula in
//! `original_source/pyvrp/search/neighbourhood.py`.

use lazysort::Sorted;

use crate::models::{IntType, ProblemData};

#[derive(Debug, Clone, Copy)]
pub struct NeighborhoodParams {
    pub weight_wait_time: f64,
    pub weight_time_warp: f64,
    pub num_granular: usize,
    pub symmetric_proximity: bool,
    pub symmetric_neighbours: bool,
}

impl Default for NeighborhoodParams {
    fn default() -> Self {
        Self {
            weight_wait_time: 0.2,
            weight_time_warp: 1.0,
            num_granular: 40,
            symmetric_proximity: true,
            symmetric_neighbours: false,
        }
    }
}

/// Flattened ragged array: `neighbours[client]` is the slice of other
/// client indices considered "close" to `client`, nearest first.
#[derive(Debug)]
pub struct Neighborhood {
    offsets: Vec<usize>,
    flat: Vec<usize>,
}

impl Neighborhood {
    pub fn neighbours(&self, client: usize) -> &[usize] {
        &self.flat[self.offsets[client]..self.offsets[client + 1]]
    }
}

fn proximity(
    data: &ProblemData,
    profile: usize,
    params: &NeighborhoodParams,
    i: usize,
    j: usize,
) -> f64 {
    let distance = data.distance(profile, i, j) as f64;
    let duration = data.duration(profile, i, j) as f64;
    let loc_i = data.location(i);
    let loc_j = data.location(j);

    let min_wait_time =
        (loc_j.tw_early as f64 - duration - loc_i.service_duration as f64 - loc_i.tw_late as f64)
            .max(0.0);
    let min_time_warp =
        (loc_i.tw_early as f64 + loc_i.service_duration as f64 + duration - loc_j.tw_late as f64)
            .max(0.0);

    distance
        + params.weight_wait_time * min_wait_time
        + params.weight_time_warp * min_time_warp
        - loc_j.prize as f64
}

pub fn compute_neighbours(
    data: &ProblemData,
    profile: usize,
    params: &NeighborhoodParams,
) -> Neighborhood {
    let num_depots = data.num_depots();
    let n = data.num_locations();

    let mut proximities: Vec<Vec<(f64, usize)>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| j != i && j >= num_depots)
                .map(|j| (proximity(data, profile, params, i, j), j))
                .collect()
        })
        .collect();

    if params.symmetric_proximity {
        for i in num_depots..n {
            for j in (i + 1)..n {
                let combined = (proximities[i]
                    .iter()
                    .find(|&&(_, k)| k == j)
                    .map(|&(d, _)| d)
                    .unwrap_or(f64::INFINITY)
                    + proximities[j]
                        .iter()
                        .find(|&&(_, k)| k == i)
                        .map(|&(d, _)| d)
                        .unwrap_or(f64::INFINITY))
                    / 2.0;
                if let Some(entry) = proximities[i].iter_mut().find(|(_, k)| *k == j) {
                    entry.0 = combined;
                }
                if let Some(entry) = proximities[j].iter_mut().find(|(_, k)| *k == i) {
                    entry.0 = combined;
                }
            }
        }
    }

    let mut offsets = Vec::with_capacity(n + 1);
    let mut flat = Vec::new();
    offsets.push(0);
    for i in 0..n {
        if i < num_depots {
            offsets.push(flat.len());
            continue;
        }
        let k = params.num_granular.min(proximities[i].len());
        let nearest: Vec<usize> = proximities[i]
            .drain(..)
            .sorted_by(|a, b| a.0.partial_cmp(&b.0).unwrap())
            .take(k)
            .map(|(_, j)| j)
            .collect();
        flat.extend(nearest);
        offsets.push(flat.len());
    }

    if params.symmetric_neighbours {
        let mut extra: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in num_depots..n {
            for &j in flat[offsets[i]..offsets[i + 1]].iter() {
                let js_neighbours = &flat[offsets[j]..offsets[j + 1]];
                if !js_neighbours.contains(&i) {
                    extra[j].push(i);
                }
            }
        }
        let mut offsets2 = Vec::with_capacity(n + 1);
        let mut flat2 = Vec::new();
        offsets2.push(0);
        for i in 0..n {
            flat2.extend_from_slice(&flat[offsets[i]..offsets[i + 1]]);
            flat2.extend_from_slice(&extra[i]);
            offsets2.push(flat2.len());
        }
        return Neighborhood {
            offsets: offsets2,
            flat: flat2,
        };
    }

    Neighborhood { offsets, flat }
}

pub fn sum_distance(data: &ProblemData, profile: usize, route: &[usize]) -> IntType {
    let mut total = 0;
    for w in route.windows(2) {
        total += data.distance(profile, w[0], w[1]);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Location, Matrix, ProblemDataBuilder, VehicleType};

    fn client(x: i64, y: i64) -> Location {
        Location {
            coord: Coordinate { x, y },
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

    fn instance_with_n_clients(n: usize) -> ProblemData {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 1000));
        for i in 0..n {
            builder.add_client(client(i as i64 + 1, 0));
        }
        let size = n + 1;
        let mut distance = Matrix::new(size, size);
        let mut duration = Matrix::new(size, size);
        for i in 0..size {
            for j in 0..size {
                if i != j {
                    let d = (i as i64 - j as i64).abs() * 10;
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
    fn depots_have_empty_neighborhoods() {
        let data = instance_with_n_clients(5);
        let neighborhood = compute_neighbours(&data, 0, &NeighborhoodParams::default());
        assert!(neighborhood.neighbours(0).is_empty());
    }

    #[test]
    fn neighborhoods_are_capped_at_num_granular() {
        let data = instance_with_n_clients(10);
        let params = NeighborhoodParams {
            num_granular: 3,
            ..NeighborhoodParams::default()
        };
        let neighborhood = compute_neighbours(&data, 0, &params);
        for c in data.num_depots()..data.num_locations() {
            assert!(neighborhood.neighbours(c).len() <= 3);
            assert!(!neighborhood.neighbours(c).contains(&c));
        }
    }

    #[test]
    fn symmetric_neighbours_flag_produces_mutual_lists() {
        let data = instance_with_n_clients(6);
        let params = NeighborhoodParams {
            num_granular: 2,
            symmetric_neighbours: true,
            ..NeighborhoodParams::default()
        };
        let neighborhood = compute_neighbours(&data, 0, &params);
        for c in data.num_depots()..data.num_locations() {
            for &other in neighborhood.neighbours(c) {
                assert!(neighborhood.neighbours(other).contains(&c));
            }
        }
    }

    #[test]
    fn nearest_client_is_the_physically_closest_one() {
        let data = instance_with_n_clients(5);
        let params = NeighborhoodParams {
            num_granular: 1,
            weight_wait_time: 0.0,
            weight_time_warp: 0.0,
            ..NeighborhoodParams::default()
        };
        let neighborhood = compute_neighbours(&data, 0, &params);
        // Client 2 (index 2) sits between clients at index 1 and 3; its
        // single nearest granular neighbour must be one of those two.
        let nearest = neighborhood.neighbours(2);
        assert_eq!(nearest.len(), 1);
        assert!(nearest[0] == 1 || nearest[0] == 3);
    }
}
