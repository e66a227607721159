//! Threshold-based acceptance criterion over a moving window of recent
//! candidate costs. Grounded verbatim on
//! `original_source/pyvrp/accept/MovingBestAverageThreshold.py`.

use instant::Instant;

use crate::errors::VrpError;
use crate::models::FloatType;

#[derive(Debug, Clone, Copy)]
pub struct MovingBestAverageThresholdParams {
    pub initial_weight: FloatType,
    pub history_length: usize,
    pub max_runtime: Option<f64>,
    pub max_iterations: Option<u64>,
}

impl MovingBestAverageThresholdParams {
    pub fn validate(&self) -> Result<(), VrpError> {
        if !(0.0..=1.0).contains(&self.initial_weight) {
            return Err(VrpError::InvalidParameter {
                name: "initial_weight",
                value: self.initial_weight.to_string(),
                constraint: "must be in [0, 1]",
            });
        }
        if self.history_length == 0 {
            return Err(VrpError::InvalidParameter {
                name: "history_length",
                value: self.history_length.to_string(),
                constraint: "must be > 0",
            });
        }
        if let Some(max_runtime) = self.max_runtime {
            if max_runtime < 0.0 {
                return Err(VrpError::InvalidParameter {
                    name: "max_runtime",
                    value: max_runtime.to_string(),
                    constraint: "must be >= 0",
                });
            }
        }
        Ok(())
    }
}

/// Accepts a candidate if its penalized cost is at most a threshold
/// interpolated between the moving window's minimum and its mean (the
/// candidate itself is folded into the window before the threshold is
/// computed). The interpolation weight decays toward zero (pure "as good
/// as the recent best") as either a time or iteration budget runs out,
/// whichever is tighter.
#[derive(Debug)]
pub struct MovingBestAverageThreshold {
    params: MovingBestAverageThresholdParams,
    history: Vec<FloatType>,
    start_time: Instant,
    iters: u64,
}

impl MovingBestAverageThreshold {
    pub fn new(params: MovingBestAverageThresholdParams) -> Result<Self, VrpError> {
        params.validate()?;
        Ok(Self {
            params,
            history: Vec::with_capacity(params.history_length),
            start_time: Instant::now(),
            iters: 0,
        })
    }

    fn runtime_budget(&self) -> f64 {
        match self.params.max_runtime {
            None => 1.0,
            Some(max_runtime) => {
                let runtime = self.start_time.elapsed().as_secs_f64();
                if max_runtime == 0.0 || runtime > max_runtime {
                    0.0
                } else {
                    1.0 - runtime / max_runtime
                }
            }
        }
    }

    fn iteration_budget(&self) -> f64 {
        match self.params.max_iterations {
            None => 1.0,
            Some(max_iterations) => {
                if max_iterations == 0 || self.iters > max_iterations {
                    0.0
                } else {
                    1.0 - self.iters as f64 / max_iterations as f64
                }
            }
        }
    }

    /// Registers `candidate_cost` in the moving window and reports whether
    /// it should be accepted as the new current solution.
    pub fn accept(&mut self, candidate_cost: FloatType) -> bool {
        if self.history.len() < self.params.history_length {
            self.history.push(candidate_cost);
        } else {
            let idx = (self.iters as usize) % self.params.history_length;
            self.history[idx] = candidate_cost;
        }

        let recent_best = self.history.iter().cloned().fold(FloatType::INFINITY, f64::min);
        let recent_avg = self.history.iter().sum::<FloatType>() / self.history.len() as FloatType;
        let budget = self.runtime_budget().min(self.iteration_budget());
        let weight = self.params.initial_weight * budget;

        self.iters += 1;

        candidate_cost <= (1.0 - weight) * recent_best + weight * recent_avg
    }
}
