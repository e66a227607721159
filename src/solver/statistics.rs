//! Per-iteration datum capture for post-hoc analysis of the ILS run.
//! Grounded on `original_source/pyvrp/Statistics.py` and
//! `original_source/pyvrp/Result.py`, written in the teacher's
//! `solver::history` idiom (a growable `Vec` of per-iteration data) rather
//! than the teacher's GA-specific `HistoricSolution`/`HistoryEntry`.

use std::fs::File;
use std::io::Write as IoWrite;

use instant::Instant;
use serde::Serialize;

use crate::models::FloatType;
use crate::solver::solution::Solution;

#[derive(Debug, Clone, Serialize)]
pub struct Datum {
    pub current_cost: FloatType,
    pub current_feasible: bool,
    pub candidate_cost: FloatType,
    pub candidate_feasible: bool,
    pub best_cost: FloatType,
    pub best_feasible: bool,
    pub threshold: FloatType,
    pub runtime: f64,
}

/// Accumulates one `Datum` per ILS iteration. Collection can be disabled
/// for long production runs where the memory cost of keeping every
/// iteration's datum is not worth paying.
#[derive(Debug)]
pub struct Statistics {
    pub data: Vec<Datum>,
    pub num_iterations: u64,
    collect: bool,
    clock: Instant,
}

impl Statistics {
    pub fn new(collect: bool) -> Self {
        Self {
            data: Vec::new(),
            num_iterations: 0,
            collect,
            clock: Instant::now(),
        }
    }

    pub fn is_collecting(&self) -> bool {
        self.collect
    }

    #[allow(clippy::too_many_arguments)]
    pub fn collect(
        &mut self,
        current_cost: FloatType,
        current_feasible: bool,
        candidate_cost: FloatType,
        candidate_feasible: bool,
        best_cost: FloatType,
        best_feasible: bool,
        threshold: FloatType,
    ) {
        self.num_iterations += 1;
        if !self.collect {
            return;
        }

        let now = Instant::now();
        let runtime = now.duration_since(self.clock).as_secs_f64();
        self.clock = now;

        self.data.push(Datum {
            current_cost,
            current_feasible,
            candidate_cost,
            candidate_feasible,
            best_cost,
            best_feasible,
            threshold,
            runtime,
        });
    }

    pub fn to_csv(&self, file_path: &str) -> std::io::Result<()> {
        let mut file = File::create(file_path)?;
        writeln!(
            file,
            "current_cost,current_feasible,candidate_cost,candidate_feasible,best_cost,best_feasible,threshold,runtime"
        )?;
        for datum in self.data.iter() {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{}",
                datum.current_cost,
                datum.current_feasible,
                datum.candidate_cost,
                datum.candidate_feasible,
                datum.best_cost,
                datum.best_feasible,
                datum.threshold,
                datum.runtime,
            )?;
        }
        Ok(())
    }
}

/// Outcome of a single `IteratedLocalSearch::run` call.
#[derive(Debug)]
pub struct SolveResult {
    pub best: Solution,
    pub statistics: Statistics,
    pub num_iterations: u64,
    pub runtime: f64,
}

impl SolveResult {
    pub fn new(best: Solution, statistics: Statistics, num_iterations: u64, runtime: f64) -> Self {
        Self {
            best,
            statistics,
            num_iterations,
            runtime,
        }
    }

    pub fn is_feasible(&self, data: &crate::models::ProblemData) -> bool {
        self.best.is_feasible(data)
    }

    pub fn summary(&self, data: &crate::models::ProblemData) -> String {
        let obj = if self.is_feasible(data) {
            format!("{}", self.best.cost(data))
        } else {
            "INFEASIBLE".to_string()
        };
        format!(
            "Solution results\n================\n    # routes: {}\n   objective: {}\n    distance: {}\n# iterations: {}\n    run-time: {:.2} seconds",
            self.best.num_routes(),
            obj,
            self.best.distance(),
            self.num_iterations,
            self.runtime,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_collection_still_counts_iterations_but_stores_nothing() {
        let mut stats = Statistics::new(false);
        stats.collect(1.0, true, 1.0, true, 1.0, true, 1.0);
        stats.collect(2.0, true, 2.0, true, 2.0, true, 2.0);
        assert_eq!(stats.num_iterations, 2);
        assert!(stats.data.is_empty());
    }

    #[test]
    fn enabled_collection_records_every_datum() {
        let mut stats = Statistics::new(true);
        stats.collect(1.0, true, 1.5, false, 1.0, true, 1.25);
        assert_eq!(stats.num_iterations, 1);
        assert_eq!(stats.data.len(), 1);
        let datum = &stats.data[0];
        assert_eq!(datum.current_cost, 1.0);
        assert_eq!(datum.candidate_cost, 1.5);
        assert!(!datum.candidate_feasible);
        assert_eq!(datum.threshold, 1.25);
    }

    #[test]
    fn solve_result_reports_infeasible_objective() {
        let best = Solution::empty();
        let stats = Statistics::new(false);
        let data = {
            use crate::models::{Coordinate, Location, Matrix, ProblemDataBuilder, VehicleType};
            let mut builder = ProblemDataBuilder::new();
            builder.add_depot(Location::depot(Coordinate { x: 0, y: 0 }, 0, 100));
            builder.add_client(Location {
                coord: Coordinate { x: 1, y: 0 },
                demand: 1,
                pickup: 0,
                service_duration: 0,
                tw_early: 0,
                tw_late: 100,
                release_time: 0,
                prize: 0,
                required: true,
                group: None,
            });
            builder.add_profile(Matrix::new(2, 2), Matrix::new(2, 2));
            builder.add_vehicle_type(VehicleType {
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
                profile: 0,
            });
            builder.build().unwrap()
        };
        // The required client was never visited -> infeasible.
        let result = SolveResult::new(best, stats, 0, 0.0);
        assert!(!result.is_feasible(&data));
        assert!(result.summary(&data).contains("INFEASIBLE"));
    }
}
