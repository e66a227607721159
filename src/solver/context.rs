use std::cell::RefCell;
use std::time::Duration;

use instant::Instant;

use crate::config::Config;
use crate::models::ProblemData;
use crate::solver::neighborhood::Neighborhood;
use crate::solver::penalty_manager::PenaltyManager;
use crate::utils::RandomStream;

/// Everything a search component needs to reach: the static problem data,
/// the mutable config (penalty weights live in `PenaltyManager`, not here,
/// but operator toggles and stop-criterion parameters do), the shared RNG,
/// and wall-clock bookkeeping. One `Context` is created per solve and
/// borrowed by the `LocalSearch`, the perturbation engine, and the ILS
/// driver, mirroring the teacher's `Context` used across `LocalSearch`,
/// `RuinRecreate` and `GeneticAlgorithm`.
pub struct Context {
    pub problem: ProblemData,
    pub config: RefCell<Config>,
    pub random: RandomStream,
    pub penalty_manager: RefCell<PenaltyManager>,
    pub neighborhood: Neighborhood,
    start_time: Instant,
}

impl Context {
    pub fn new(
        problem: ProblemData,
        config: Config,
        penalty_manager: PenaltyManager,
        neighborhood: Neighborhood,
    ) -> Self {
        let random = if config.deterministic {
            RandomStream::from_seed(config.seed)
        } else {
            RandomStream::new()
        };
        Self {
            problem,
            config: RefCell::new(config),
            random,
            penalty_manager: RefCell::new(penalty_manager),
            neighborhood,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn elapsed_as_secs_f64(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}
