use clap::{App, Arg};

/// Representing the resulting command line arguments
pub struct Args {
    pub instance_path: String,
    pub solution_path: Option<String>,
    pub time_limit: Option<f64>,
    pub max_iterations: Option<u64>,
    pub max_iterations_no_improvement: Option<u64>,
    pub first_feasible: bool,
    pub bks_value: Option<f64>,
    pub seed: Option<u64>,
    pub config_path: Option<String>,
    pub round_func: String,
    pub minimise_fleet: bool,
}

impl Args {
    /// Setup the clap app and parse the command line arguments
    pub fn parse() -> Self {
        let matches = App::new("vrp_solve")
            .version("0.1")
            .author("Martin Simensen")
            .about("Iterated Local Search solver for vehicle routing problems")
            .arg(
                Arg::with_name("instance_path")
                    .required(true)
                    .help("Path to the VRPLIB instance file"),
            )
            .arg(
                Arg::with_name("solution_path")
                    .short("o")
                    .takes_value(true)
                    .default_value("output.sol")
                    .help("Path to solution output"),
            )
            .arg(
                Arg::with_name("config")
                    .short("c")
                    .takes_value(true)
                    .help("Path to a YAML config file patched over the defaults"),
            )
            .arg(
                Arg::with_name("iterations")
                    .short("i")
                    .takes_value(true)
                    .help("Maximum number of iterations"),
            )
            .arg(
                Arg::with_name("no_improvement")
                    .short("n")
                    .takes_value(true)
                    .help("Stop after this many iterations without improvement"),
            )
            .arg(
                Arg::with_name("time_limit")
                    .short("t")
                    .takes_value(true)
                    .help("Time limit in seconds"),
            )
            .arg(
                Arg::with_name("first_feasible")
                    .short("f")
                    .help("Stop as soon as a feasible solution is found"),
            )
            .arg(
                Arg::with_name("bks")
                    .short("b")
                    .takes_value(true)
                    .help("Stop once this best-known-solution value is reached"),
            )
            .arg(
                Arg::with_name("seed")
                    .short("s")
                    .takes_value(true)
                    .help("Random seed"),
            )
            .arg(
                Arg::with_name("round_func")
                    .short("r")
                    .takes_value(true)
                    .default_value("round")
                    .possible_values(&["none", "round", "trunc", "dimacs", "exact"])
                    .help("Rounding policy applied to the instance's coordinates and matrices"),
            )
            .arg(
                Arg::with_name("minimise_fleet")
                    .long("minimise-fleet")
                    .help("After the main solve, try to shrink the fleet while staying feasible"),
            )
            .get_matches();

        let instance_path = matches
            .value_of("instance_path")
            .expect("Instance path is not provided")
            .to_owned();

        let solution_path = matches.value_of("solution_path").map(String::from);
        let config_path = matches.value_of("config").map(String::from);

        let max_iterations = matches
            .value_of("iterations")
            .map(|value| value.parse::<u64>().expect("Invalid iterations argument!"));

        let max_iterations_no_improvement = matches
            .value_of("no_improvement")
            .map(|value| value.parse::<u64>().expect("Invalid no_improvement argument!"));

        let time_limit = matches
            .value_of("time_limit")
            .map(|value| value.parse::<f64>().expect("Invalid time limit argument!"));

        let bks_value = matches
            .value_of("bks")
            .map(|value| value.parse::<f64>().expect("Invalid bks argument!"));

        let seed = matches
            .value_of("seed")
            .map(|value| value.parse::<u64>().expect("Invalid seed argument!"));

        let first_feasible = matches.is_present("first_feasible");
        let minimise_fleet = matches.is_present("minimise_fleet");

        let round_func = matches
            .value_of("round_func")
            .unwrap_or("round")
            .to_owned();

        Self {
            instance_path,
            solution_path,
            time_limit,
            max_iterations,
            max_iterations_no_improvement,
            first_feasible,
            bks_value,
            seed,
            config_path,
            round_func,
            minimise_fleet,
        }
    }
}
