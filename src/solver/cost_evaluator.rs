//! Translates raw route measurements (distance, duration, load, time warp)
//! into the single scalar the search optimizes: a penalized cost that is
//! exact on the feasible subspace and smoothly worsens as constraints are
//! violated. Generalizes the teacher's `solver::evaluate::route_cost`
//! (distance + capacity-overload penalty only) to the full penalty set.

use crate::models::{FloatType, IntType};

#[inline]
pub fn route_cost(distance: IntType, overload: IntType, penalty: FloatType) -> FloatType {
    distance as FloatType + penalty * std::cmp::max(0, overload) as FloatType
}

/// Weights applied to each kind of constraint violation. Held by the
/// `PenaltyManager`, which adapts them between iterations.
#[derive(Debug, Clone, Copy)]
pub struct CostEvaluator {
    pub load_penalty: FloatType,
    pub tw_penalty: FloatType,
    pub distance_penalty: FloatType,
}

impl CostEvaluator {
    pub fn new(load_penalty: FloatType, tw_penalty: FloatType, distance_penalty: FloatType) -> Self {
        Self {
            load_penalty,
            tw_penalty,
            distance_penalty,
        }
    }

    /// Pure travel cost, ignoring any penalties. Used to report a
    /// solution's final objective once feasibility has been confirmed.
    pub fn cost(&self, distance: IntType, fixed_cost: IntType) -> FloatType {
        distance as FloatType + fixed_cost as FloatType
    }

    /// Cost including penalized infeasibility, used while searching.
    pub fn penalised_cost(
        &self,
        distance: IntType,
        fixed_cost: IntType,
        excess_load: IntType,
        time_warp: IntType,
        excess_distance: IntType,
    ) -> FloatType {
        distance as FloatType
            + fixed_cost as FloatType
            + self.load_penalty * std::cmp::max(0, excess_load) as FloatType
            + self.tw_penalty * std::cmp::max(0, time_warp) as FloatType
            + self.distance_penalty * std::cmp::max(0, excess_distance) as FloatType
    }

    /// Marginal cost of `delta_*` changes, without recomputing full route
    /// aggregates. Used by move evaluation in the hot loop.
    pub fn delta_cost(
        &self,
        delta_distance: IntType,
        delta_excess_load: IntType,
        delta_time_warp: IntType,
        delta_excess_distance: IntType,
    ) -> FloatType {
        delta_distance as FloatType
            + self.load_penalty * delta_excess_load as FloatType
            + self.tw_penalty * delta_time_warp as FloatType
            + self.distance_penalty * delta_excess_distance as FloatType
    }
}

impl Default for CostEvaluator {
    fn default() -> Self {
        Self {
            load_penalty: 1.0,
            tw_penalty: 1.0,
            distance_penalty: 1.0,
        }
    }
}
