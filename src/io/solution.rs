//! Plain-text solution file reader/writer (spec.md §6.2). Grounded on the
//! teacher's `utils::serializer::write_solution_file`.

use std::fs::File;
use std::io::{BufRead, BufReader, Write as IoWrite};

use anyhow::{Context as AnyhowContext, Result};

use crate::constants::COST_INFEAS;
use crate::models::ProblemData;
use crate::solver::solution::Solution;

/// Writes one `Route #k : c1 c2 ... cm` line per non-empty route (clients
/// 1-based, relative to the instance's combined depot+client index
/// space) followed by a trailing `Cost <value>` line.
pub fn write_solution_file(path: &str, solution: &Solution, data: &ProblemData) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating solution file {}", path))?;

    let mut k = 1;
    for route in solution.routes.iter().filter(|r| !r.is_empty()) {
        let clients: Vec<String> = route.visits.iter().map(|c| (c + 1).to_string()).collect();
        writeln!(file, "Route #{} : {}", k, clients.join(" "))?;
        k += 1;
    }

    let cost = if solution.is_feasible(data) {
        solution.cost(data)
    } else {
        COST_INFEAS
    };
    writeln!(file, "Cost {}", cost)?;
    Ok(())
}

/// Reads a solution file's routes back as 0-based client-index vectors.
/// Empty routes (no clients) are ignored, matching spec.md §6.2; a
/// trailing `Cost` line, if present, is skipped. The caller is responsible
/// for re-associating each route with a vehicle type and re-evaluating its
/// aggregates -- a bare route listing carries no vehicle-type information.
pub fn read_solution_file(path: &str) -> Result<Vec<Vec<usize>>> {
    let file = File::open(path).with_context(|| format!("opening solution file {}", path))?;
    let reader = BufReader::new(file);
    let mut routes = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("Cost") {
            continue;
        }

        let rest = match trimmed.split_once(':') {
            Some((_, rest)) => rest,
            None => continue,
        };

        let clients: Vec<usize> = rest
            .split_whitespace()
            .map(|tok| {
                tok.parse::<usize>()
                    .map(|v| v - 1)
                    .with_context(|| format!("invalid client index '{}' in {}", tok, path))
            })
            .collect::<Result<_>>()?;

        if !clients.is_empty() {
            routes.push(clients);
        }
    }
    Ok(routes)
}
