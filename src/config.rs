use std::fs::File;
use std::io::BufReader;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::FloatType;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    // General
    pub problem_instance: String,
    pub solution_path: Option<String>,
    pub run_id: Option<Uuid>,
    pub log_interval: u64,

    // Randomization
    pub deterministic: bool,
    pub seed: u64,

    // Stop criteria
    pub time_limit: Option<f64>,
    pub max_iterations: Option<u64>,
    pub max_iterations_no_improvement: Option<u64>,
    pub first_feasible: bool,
    pub bks_value: Option<f64>,

    // Iterated Local Search
    pub ils_initial_accept_weight: f64,
    pub ils_history_length: usize,
    pub ils_num_iters_no_improvement: u64,

    // Penalty management
    pub penalty_load: FloatType,
    pub penalty_time_warp: FloatType,
    pub penalty_distance: FloatType,
    pub penalty_feasibility_target: FloatType,
    pub penalty_tolerance_band: FloatType,
    pub penalty_inc_multiplier: FloatType,
    pub penalty_dec_multiplier: FloatType,
    pub penalty_history_length: usize,

    // Neighbourhood
    pub neighbourhood_weight_wait_time: FloatType,
    pub neighbourhood_weight_time_warp: FloatType,
    pub neighbourhood_size: usize,
    pub neighbourhood_symmetric_proximity: bool,
    pub neighbourhood_symmetric_neighbours: bool,

    // Local Search node operators
    pub relocate_single: bool,
    pub relocate_double: bool,
    pub relocate_double_reverse: bool,
    pub swap_one_with_one: bool,
    pub swap_two_with_one: bool,
    pub swap_two_with_two: bool,
    pub two_opt_intra_reverse: bool,
    pub two_opt_inter_reverse: bool,
    pub two_opt_inter: bool,

    // Local Search route operators
    pub swap_star: bool,
    pub relocate_star: bool,

    // Perturbation
    pub destroy_num_min: usize,
    pub destroy_num_max: usize,
    pub convergence_target_pairs_min: f64,
    pub convergence_target_pairs_max: f64,
    pub convergence_penalty_increase: f64,
    pub convergence_penalty_decrease: f64,
    pub convergence_solutions_between_updates: u64,
    pub repair_blink_rate: FloatType,

    // Fleet minimisation
    pub fleet_min_runtime: f64,
}

impl Config {
    pub fn default() -> Self {
        Self {
            problem_instance: String::new(),
            solution_path: None,
            run_id: None,
            log_interval: 100,

            deterministic: false,
            seed: 1,

            time_limit: Some(60.0),
            max_iterations: None,
            max_iterations_no_improvement: Some(20_000),
            first_feasible: false,
            bks_value: None,

            ils_initial_accept_weight: 1.0,
            ils_history_length: 500,
            ils_num_iters_no_improvement: 20_000,

            penalty_load: 1.0,
            penalty_time_warp: 1.0,
            penalty_distance: 1.0,
            penalty_feasibility_target: 0.43,
            penalty_tolerance_band: 0.05,
            penalty_inc_multiplier: 1.2,
            penalty_dec_multiplier: 0.85,
            penalty_history_length: 100,

            neighbourhood_weight_wait_time: 0.2,
            neighbourhood_weight_time_warp: 1.0,
            neighbourhood_size: 40,
            neighbourhood_symmetric_proximity: true,
            neighbourhood_symmetric_neighbours: false,

            relocate_single: true,
            relocate_double: true,
            relocate_double_reverse: true,
            swap_one_with_one: true,
            swap_two_with_one: true,
            swap_two_with_two: true,
            two_opt_intra_reverse: true,
            two_opt_inter_reverse: true,
            two_opt_inter: true,

            swap_star: true,
            relocate_star: true,

            destroy_num_min: 10,
            destroy_num_max: 25,
            convergence_target_pairs_min: 10.0,
            convergence_target_pairs_max: 20.0,
            convergence_penalty_increase: 1.0,
            convergence_penalty_decrease: 5.0,
            convergence_solutions_between_updates: 100,
            repair_blink_rate: 0.01,

            fleet_min_runtime: 60.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn read_yaml_file(filepath: &str) -> Value {
        let file = File::open(filepath).unwrap_or_else(|e| panic!("Cannot open file {}: {}", filepath, e));
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", filepath, e))
    }

    pub fn load_yaml_file(filepath: &str) -> Self {
        let mut config = Self::default();
        config.patch(&Self::read_yaml_file(filepath));
        config
    }

    pub fn patch_from_yaml_file(&mut self, filepath: &str) {
        self.patch(&Self::read_yaml_file(filepath));
    }

    pub fn patch(&mut self, values: &Value) {
        let mut config: Value = serde_json::to_value(&self).expect("Failed to serialize config");
        match values {
            Value::Object(values_map) => {
                for (key, value) in values_map.iter() {
                    let root_key = format!("/{}", key);
                    if let Some(config_value) = config.pointer_mut(&root_key) {
                        *config_value = value.clone();
                    }
                }
            }
            _ => panic!("Cannot patch Config as JSON is not an Object"),
        }
        *self = serde_json::from_value(config).expect("Failed to deserialize patched config");
    }
}
