//! CLI entry point: reads a VRPLIB instance, runs the Iterated Local
//! Search driver until a stop criterion fires, optionally shrinks the
//! fleet, and writes the resulting solution. Grounded on the teacher's
//! `main.rs` wiring of `cli::Args` + `config::Config` + the solve loop,
//! generalized from the teacher's genetic-algorithm driver to the ILS one.

use anyhow::{Context as AnyhowContext, Result};
use log::info;

use vrp_ils::cli::Args;
use vrp_ils::config::Config;
use vrp_ils::io::solution::write_solution_file;
use vrp_ils::io::vrplib::{read_instance, RoundingFunction};
use vrp_ils::solver::bootstrap;
use vrp_ils::solver::fleet::minimise_fleet;
use vrp_ils::solver::ils::{IteratedLocalSearch, IteratedLocalSearchParams};
use vrp_ils::solver::stop::{FirstFeasible, MaxIterations, MaxRuntime, MultipleCriteria, NoImprovement, ReachedBKS, StoppingCriterion};

fn build_stop_criterion(config: &Config) -> Result<Box<dyn StoppingCriterion>> {
    let mut criteria: Vec<Box<dyn StoppingCriterion>> = Vec::new();

    if let Some(time_limit) = config.time_limit {
        criteria.push(Box::new(MaxRuntime::new(time_limit)?));
    }
    if let Some(max_iterations) = config.max_iterations {
        criteria.push(Box::new(MaxIterations::new(max_iterations)));
    }
    if let Some(max_iterations_no_improvement) = config.max_iterations_no_improvement {
        criteria.push(Box::new(NoImprovement::new(max_iterations_no_improvement)));
    }
    if config.first_feasible {
        criteria.push(Box::new(FirstFeasible));
    }
    if let Some(bks_value) = config.bks_value {
        criteria.push(Box::new(ReachedBKS::new(bks_value)?));
    }

    if criteria.is_empty() {
        criteria.push(Box::new(MaxRuntime::new(60.0)?));
    }

    Ok(Box::new(MultipleCriteria::new(criteria)?))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config_path {
        Some(path) => Config::load_yaml_file(path),
        None => Config::default(),
    };
    config.problem_instance = args.instance_path.clone();
    if let Some(solution_path) = &args.solution_path {
        config.solution_path = Some(solution_path.clone());
    }
    if let Some(time_limit) = args.time_limit {
        config.time_limit = Some(time_limit);
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = Some(max_iterations);
    }
    if let Some(max_iterations_no_improvement) = args.max_iterations_no_improvement {
        config.max_iterations_no_improvement = Some(max_iterations_no_improvement);
    }
    if args.first_feasible {
        config.first_feasible = true;
    }
    if let Some(bks_value) = args.bks_value {
        config.bks_value = Some(bks_value);
    }
    if let Some(seed) = args.seed {
        config.deterministic = true;
        config.seed = seed;
    }

    let round_func = RoundingFunction::parse(&args.round_func)?;

    info!("reading instance {}", args.instance_path);
    let data = read_instance(&args.instance_path, round_func)
        .with_context(|| format!("reading instance {}", args.instance_path))?;

    let (ctx, mut search_method, initial) = bootstrap::build(data, config.clone());

    let ils = IteratedLocalSearch::new(IteratedLocalSearchParams {
        initial_accept_weight: config.ils_initial_accept_weight,
        history_length: config.ils_history_length,
        num_iters_no_improvement: config.ils_num_iters_no_improvement,
        ..IteratedLocalSearchParams::default()
    });

    let mut stop = build_stop_criterion(&config)?;
    let result = ils.run(&ctx, initial, &mut search_method, stop.as_mut(), true);

    info!("{}", result.summary(&ctx.problem));

    let (final_data, final_solution) = if args.minimise_fleet && result.is_feasible(&ctx.problem) {
        info!("minimising fleet for up to {} seconds", config.fleet_min_runtime);
        minimise_fleet(ctx.problem.clone(), config.clone(), result.best.clone(), config.fleet_min_runtime)
    } else {
        (ctx.problem.clone(), result.best)
    };

    let solution_path = config.solution_path.as_deref().unwrap_or("output.sol");
    write_solution_file(solution_path, &final_solution, &final_data)
        .with_context(|| format!("writing solution to {}", solution_path))?;
    info!("wrote solution to {}", solution_path);

    Ok(())
}
