//! The static problem description the solver reads from. Generalizes the
//! single-depot, single-vehicle-type model into the richer multi-depot,
//! heterogeneous-fleet, time-windowed model the instance formats describe.

use crate::errors::VrpError;
use crate::models::{FloatType, IntType, Matrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

/// A depot or a client. Depots are stored first in `ProblemData::locations`,
/// so `index < num_depots` identifies a depot.
#[derive(Debug, Clone)]
pub struct Location {
    pub coord: Coordinate,
    pub demand: IntType,
    pub pickup: IntType,
    pub service_duration: IntType,
    pub tw_early: IntType,
    pub tw_late: IntType,
    pub release_time: IntType,
    pub prize: IntType,
    pub required: bool,
    /// Index into `ProblemData::groups`, if this client belongs to one.
    pub group: Option<usize>,
}

impl Location {
    pub fn depot(coord: Coordinate, tw_early: IntType, tw_late: IntType) -> Self {
        Self {
            coord,
            demand: 0,
            pickup: 0,
            service_duration: 0,
            tw_early,
            tw_late,
            release_time: 0,
            prize: 0,
            required: true,
            group: None,
        }
    }

    pub fn is_client(&self, index: usize, num_depots: usize) -> bool {
        let _ = self;
        index >= num_depots
    }
}

/// A set of mutually-exclusive or "pick at least one" clients.
#[derive(Debug, Clone)]
pub struct ClientGroup {
    pub members: Vec<usize>,
    pub mutually_exclusive: bool,
}

#[derive(Debug, Clone)]
pub struct VehicleType {
    pub name: Option<String>,
    pub num_available: usize,
    pub capacity: IntType,
    pub start_depot: usize,
    pub end_depot: usize,
    pub fixed_cost: IntType,
    pub unit_distance_cost: FloatType,
    pub unit_duration_cost: FloatType,
    pub tw_early: IntType,
    pub tw_late: IntType,
    pub max_duration: IntType,
    pub max_distance: IntType,
    /// Index into `ProblemData`'s list of distance/duration matrix pairs.
    pub profile: usize,
}

/// Fully validated, immutable problem instance. Constructed only through
/// `ProblemDataBuilder::build`, which enforces the invariants below.
#[derive(Debug, Clone)]
pub struct ProblemData {
    locations: Vec<Location>,
    num_depots: usize,
    profiles: Vec<(Matrix<IntType>, Matrix<IntType>)>,
    vehicle_types: Vec<VehicleType>,
    groups: Vec<ClientGroup>,
}

impl ProblemData {
    pub fn num_depots(&self) -> usize {
        self.num_depots
    }

    pub fn num_clients(&self) -> usize {
        self.locations.len() - self.num_depots
    }

    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }

    pub fn location(&self, index: usize) -> &Location {
        &self.locations[index]
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn is_depot(&self, index: usize) -> bool {
        index < self.num_depots
    }

    pub fn vehicle_types(&self) -> &[VehicleType] {
        &self.vehicle_types
    }

    pub fn vehicle_type(&self, index: usize) -> &VehicleType {
        &self.vehicle_types[index]
    }

    pub fn num_vehicles(&self) -> usize {
        self.vehicle_types.iter().map(|v| v.num_available).sum()
    }

    pub fn groups(&self) -> &[ClientGroup] {
        &self.groups
    }

    /// Returns a copy of this instance with its fleet replaced, used by
    /// fleet-size minimization to re-solve with fewer vehicles without
    /// re-reading the instance file or recomputing neighbourhoods from
    /// scratch for every trial fleet. Locations, profiles and groups are
    /// shared by deep copy since this runs only a handful of times per
    /// solve, not in the search hot path.
    pub fn with_vehicle_types(&self, vehicle_types: Vec<VehicleType>) -> Self {
        Self {
            locations: self.locations.clone(),
            num_depots: self.num_depots,
            profiles: self.profiles.clone(),
            vehicle_types,
            groups: self.groups.clone(),
        }
    }

    pub fn distance(&self, profile: usize, from: usize, to: usize) -> IntType {
        self.profiles[profile].0.get(from, to)
    }

    pub fn duration(&self, profile: usize, from: usize, to: usize) -> IntType {
        self.profiles[profile].1.get(from, to)
    }

    pub fn num_profiles(&self) -> usize {
        self.profiles.len()
    }

    pub fn total_demand(&self) -> IntType {
        self.locations[self.num_depots..]
            .iter()
            .map(|l| l.demand)
            .sum()
    }

    pub fn max_demand(&self) -> IntType {
        self.locations[self.num_depots..]
            .iter()
            .map(|l| l.demand)
            .max()
            .unwrap_or(0)
    }

    /// Quantized polar angle of `index` around the average depot location,
    /// used to build/extend `CircleSector`s. Matches the teacher's
    /// `Problem::get_angle` (atan2 scaled to a 16-bit circle).
    pub fn get_angle(&self, index: usize) -> i32 {
        let depot = &self.locations[0].coord;
        let loc = &self.locations[index].coord;
        let dx = (loc.x - depot.x) as f64;
        let dy = (loc.y - depot.y) as f64;
        let angle = dy.atan2(dx);
        ((angle * 32768.0 / std::f64::consts::PI) as i32).rem_euclid(65536)
    }
}

pub struct ProblemDataBuilder {
    locations: Vec<Location>,
    num_depots: usize,
    profiles: Vec<(Matrix<IntType>, Matrix<IntType>)>,
    vehicle_types: Vec<VehicleType>,
    groups: Vec<ClientGroup>,
}

impl ProblemDataBuilder {
    pub fn new() -> Self {
        Self {
            locations: Vec::new(),
            num_depots: 0,
            profiles: Vec::new(),
            vehicle_types: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn add_depot(&mut self, location: Location) -> &mut Self {
        self.locations.insert(self.num_depots, location);
        self.num_depots += 1;
        self
    }

    pub fn add_client(&mut self, location: Location) -> &mut Self {
        self.locations.push(location);
        self
    }

    pub fn add_profile(&mut self, distance: Matrix<IntType>, duration: Matrix<IntType>) -> &mut Self {
        self.profiles.push((distance, duration));
        self
    }

    pub fn add_vehicle_type(&mut self, vehicle_type: VehicleType) -> &mut Self {
        self.vehicle_types.push(vehicle_type);
        self
    }

    pub fn add_group(&mut self, group: ClientGroup) -> &mut Self {
        self.groups.push(group);
        self
    }

    pub fn build(self) -> Result<ProblemData, VrpError> {
        if self.num_depots == 0 {
            return Err(VrpError::NoDepot);
        }

        for (index, location) in self.locations.iter().enumerate() {
            if location.tw_early > location.tw_late {
                return Err(VrpError::InvalidTimeWindow {
                    index,
                    early: location.tw_early,
                    late: location.tw_late,
                });
            }
            if location.demand < 0 || location.pickup < 0 {
                return Err(VrpError::NegativeDemand { index });
            }
        }

        let num_locations = self.locations.len();
        for (index, profile) in self.profiles.iter().enumerate() {
            if profile.0.rows != num_locations || profile.0.cols != num_locations {
                return Err(VrpError::MatrixDimensionMismatch {
                    profile: index,
                    expected: num_locations,
                    rows: profile.0.rows,
                    cols: profile.0.cols,
                });
            }
        }

        for (index, vt) in self.vehicle_types.iter().enumerate() {
            if vt.start_depot >= self.num_depots {
                return Err(VrpError::InvalidDepot {
                    index,
                    depot: vt.start_depot,
                    num_depots: self.num_depots,
                });
            }
            if vt.end_depot >= self.num_depots {
                return Err(VrpError::InvalidDepot {
                    index,
                    depot: vt.end_depot,
                    num_depots: self.num_depots,
                });
            }
            if vt.profile >= self.profiles.len() {
                return Err(VrpError::InvalidProfile {
                    index,
                    profile: vt.profile,
                    num_profiles: self.profiles.len(),
                });
            }
            if vt.num_available == 0 {
                return Err(VrpError::NoAvailableVehicles { index });
            }
        }

        for (index, group) in self.groups.iter().enumerate() {
            for &member in group.members.iter() {
                if member >= num_locations {
                    return Err(VrpError::InvalidGroupMember {
                        index,
                        client: member,
                        num_locations,
                    });
                }
                if group.mutually_exclusive && self.locations[member].required {
                    return Err(VrpError::RequiredClientInExclusiveGroup {
                        index,
                        client: member,
                    });
                }
            }
        }

        Ok(ProblemData {
            locations: self.locations,
            num_depots: self.num_depots,
            profiles: self.profiles,
            vehicle_types: self.vehicle_types,
            groups: self.groups,
        })
    }
}

impl Default for ProblemDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depot() -> Location {
        Location::depot(Coordinate { x: 0, y: 0 }, 0, 100)
    }

    fn client() -> Location {
        Location {
            coord: Coordinate { x: 1, y: 1 },
            demand: 1,
            pickup: 0,
            service_duration: 0,
            tw_early: 0,
            tw_late: 100,
            release_time: 0,
            prize: 0,
            required: true,
            group: None,
        }
    }

    fn vehicle_type(profile: usize) -> VehicleType {
        VehicleType {
            name: None,
            num_available: 1,
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
            profile,
        }
    }

    #[test]
    fn rejects_instance_without_a_depot() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_client(client());
        assert_eq!(builder.build().unwrap_err(), VrpError::NoDepot);
    }

    #[test]
    fn rejects_inverted_time_window() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(depot());
        let mut bad = client();
        bad.tw_early = 50;
        bad.tw_late = 10;
        builder.add_client(bad);
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        builder.add_vehicle_type(vehicle_type(0));
        assert!(matches!(
            builder.build().unwrap_err(),
            VrpError::InvalidTimeWindow { index: 1, .. }
        ));
    }

    #[test]
    fn rejects_negative_demand() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(depot());
        let mut bad = client();
        bad.demand = -1;
        builder.add_client(bad);
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        builder.add_vehicle_type(vehicle_type(0));
        assert!(matches!(
            builder.build().unwrap_err(),
            VrpError::NegativeDemand { index: 1 }
        ));
    }

    #[test]
    fn rejects_vehicle_type_with_zero_available() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(depot());
        builder.add_client(client());
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        let mut vt = vehicle_type(0);
        vt.num_available = 0;
        builder.add_vehicle_type(vt);
        assert!(matches!(
            builder.build().unwrap_err(),
            VrpError::NoAvailableVehicles { index: 0 }
        ));
    }

    #[test]
    fn rejects_out_of_range_depot_and_profile() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(depot());
        builder.add_client(client());
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        let mut vt = vehicle_type(0);
        vt.start_depot = 5;
        builder.add_vehicle_type(vt);
        assert!(matches!(
            builder.build().unwrap_err(),
            VrpError::InvalidDepot { index: 0, .. }
        ));

        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(depot());
        builder.add_client(client());
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        let mut vt = vehicle_type(1);
        vt.profile = 1;
        builder.add_vehicle_type(vt);
        assert!(matches!(
            builder.build().unwrap_err(),
            VrpError::InvalidProfile { index: 0, .. }
        ));
    }

    #[test]
    fn rejects_required_client_in_exclusive_group() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(depot());
        builder.add_client(client());
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        builder.add_vehicle_type(vehicle_type(0));
        builder.add_group(ClientGroup {
            members: vec![1],
            mutually_exclusive: true,
        });
        assert!(matches!(
            builder.build().unwrap_err(),
            VrpError::RequiredClientInExclusiveGroup { index: 0, client: 1 }
        ));
    }

    #[test]
    fn rejects_mismatched_matrix_dimensions() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(depot());
        builder.add_client(client());
        builder.add_profile(Matrix::new(3, 3), Matrix::new(3, 3));
        builder.add_vehicle_type(vehicle_type(0));
        assert!(matches!(
            builder.build().unwrap_err(),
            VrpError::MatrixDimensionMismatch { profile: 0, expected: 2, .. }
        ));
    }

    #[test]
    fn accepts_well_formed_instance() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(depot());
        builder.add_client(client());
        builder.add_client(client());
        let mut distance = Matrix::new(3, 3);
        let mut duration = Matrix::new(3, 3);
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    distance.set(i, j, 10);
                    duration.set(i, j, 10);
                }
            }
        }
        builder.add_profile(distance, duration);
        builder.add_vehicle_type(vehicle_type(0));
        let data = builder.build().unwrap();

        assert_eq!(data.num_depots(), 1);
        assert_eq!(data.num_clients(), 2);
        assert_eq!(data.num_locations(), 3);
        assert!(data.is_depot(0));
        assert!(!data.is_depot(1));
        assert_eq!(data.total_demand(), 2);
        assert_eq!(data.max_demand(), 1);
        assert_eq!(data.distance(0, 0, 1), 10);
    }

    #[test]
    fn with_vehicle_types_replaces_fleet_only() {
        let mut builder = ProblemDataBuilder::new();
        builder.add_depot(depot());
        builder.add_client(client());
        builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
        builder.add_vehicle_type(vehicle_type(0));
        let data = builder.build().unwrap();

        let mut replacement = vehicle_type(0);
        replacement.num_available = 3;
        let data2 = data.with_vehicle_types(vec![replacement]);

        assert_eq!(data2.num_vehicles(), 3);
        assert_eq!(data2.num_locations(), data.num_locations());
    }
}
