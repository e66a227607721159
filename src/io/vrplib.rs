//! VRPLIB-derived instance file reader (spec.md §6.1). Grounded on the
//! teacher's `utils::parser::parse_problem` tokenizing style (a header of
//! `KEY : VALUE` lines followed by named `..._SECTION` blocks),
//! generalized to the full section/rounding-policy list SPEC_FULL §6.1
//! names. Kept as a thin shell per spec.md §1: this module's only job is
//! to produce a validated `ProblemData`, after which the core never looks
//! at the file again.

use std::collections::{HashMap, HashSet};
use std::fs::read_to_string;

use anyhow::{anyhow, bail, Context as AnyhowContext, Result};

use crate::constants::MAX_VALUE;
use crate::models::{
    ClientGroup, Coordinate, IntType, Location, Matrix, ProblemData, ProblemDataBuilder,
    VehicleType,
};

/// One of the five rounding policies spec.md §6.1 recognizes, applied to
/// every coordinate and every computed/explicit distance and duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingFunction {
    None,
    Round,
    Trunc,
    Dimacs,
    Exact,
}

impl RoundingFunction {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "round" => Ok(Self::Round),
            "trunc" => Ok(Self::Trunc),
            "dimacs" => Ok(Self::Dimacs),
            "exact" => Ok(Self::Exact),
            other => bail!("unknown round function '{}'", other),
        }
    }

    pub fn apply(&self, value: f64) -> IntType {
        match self {
            Self::None => value as IntType,
            Self::Round => value.round() as IntType,
            Self::Trunc => value.trunc() as IntType,
            Self::Dimacs => (value * 10.0).round() as IntType,
            Self::Exact => (value * 1000.0).round() as IntType,
        }
    }
}

type Row = Vec<String>;

/// The header/section split of a VRPLIB file, before any domain
/// interpretation. `EOF` lines are dropped; anything after the last
/// recognized section header is appended as further rows of that section.
struct RawInstance {
    headers: HashMap<String, String>,
    sections: HashMap<String, Vec<Row>>,
}

fn split_header(line: &str) -> (String, String) {
    if let Some(idx) = line.find(':') {
        (line[..idx].trim().to_string(), line[idx + 1..].trim().to_string())
    } else {
        let mut parts = line.splitn(2, char::is_whitespace);
        let key = parts.next().unwrap_or("").trim().to_string();
        let value = parts.next().unwrap_or("").trim().to_string();
        (key, value)
    }
}

fn parse_raw(content: &str) -> RawInstance {
    let mut headers = HashMap::new();
    let mut sections: HashMap<String, Vec<Row>> = HashMap::new();
    let mut current_section: Option<String> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("EOF") {
            continue;
        }
        if line.ends_with("_SECTION") {
            current_section = Some(line.to_string());
            sections.entry(line.to_string()).or_default();
            continue;
        }
        if let Some(section) = &current_section {
            sections
                .get_mut(section)
                .expect("section registered on first sight")
                .push(line.split_whitespace().map(String::from).collect());
            continue;
        }
        let (key, value) = split_header(line);
        if !key.is_empty() {
            headers.insert(key, value);
        }
    }

    RawInstance { headers, sections }
}

fn euclidean(a: Coordinate, b: Coordinate) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Reads a VRPLIB-derived instance file into a validated `ProblemData`.
/// Recognizes the header keys and sections listed in spec.md §6.1; fields
/// it does not recognize are ignored rather than rejected, since VRPLIB
/// dialects commonly carry extra vendor-specific keys.
///
/// `round_func` is supplied by the caller rather than read from the file:
/// VRPLIB itself carries no such header, and which policy applies is a
/// property of the instance set (e.g. DIMACS-derived instances use
/// `dimacs`), not of any single file.
pub fn read_instance(path: &str, round_func: RoundingFunction) -> Result<ProblemData> {
    let content =
        read_to_string(path).with_context(|| format!("reading instance file {}", path))?;
    let raw = parse_raw(&content);

    let dimension: usize = raw
        .headers
        .get("DIMENSION")
        .ok_or_else(|| anyhow!("instance is missing a DIMENSION header"))?
        .parse()
        .context("DIMENSION must be an integer")?;

    let edge_weight_type = raw
        .headers
        .get("EDGE_WEIGHT_TYPE")
        .cloned()
        .unwrap_or_else(|| "EUC_2D".to_string());
    let edge_weight_format = raw.headers.get("EDGE_WEIGHT_FORMAT").cloned();

    let service_time_scalar: f64 = raw
        .headers
        .get("SERVICE_TIME")
        .map(|v| v.parse())
        .transpose()
        .context("SERVICE_TIME must be numeric")?
        .unwrap_or(0.0);

    // Depot indices must be 1-based, contiguous from 1, and the lowest
    // indices (spec.md §6.1) -- so once converted to 0-based they are
    // exactly 0..num_depots, and no remapping of the rest is needed.
    let depot_indices: Vec<i64> = raw
        .sections
        .get("DEPOT_SECTION")
        .map(|rows| {
            rows.iter()
                .flat_map(|row| row.iter())
                .filter_map(|tok| tok.parse::<i64>().ok())
                .take_while(|&v| v != -1)
                .collect()
        })
        .unwrap_or_else(|| vec![1]);
    if depot_indices.is_empty() {
        bail!("DEPOT_SECTION must list at least one depot");
    }
    let num_depots = depot_indices.len();
    for (position, &depot) in depot_indices.iter().enumerate() {
        if depot != (position as i64 + 1) {
            bail!("depot indices must be contiguous 1-based, starting from 1");
        }
    }

    let mut coords = vec![Coordinate { x: 0, y: 0 }; dimension];
    if let Some(rows) = raw.sections.get("NODE_COORD_SECTION") {
        for row in rows {
            let idx: usize = row[0].parse::<usize>()? - 1;
            let x: f64 = row[1].parse()?;
            let y: f64 = row[2].parse()?;
            coords[idx] = Coordinate {
                x: round_func.apply(x),
                y: round_func.apply(y),
            };
        }
    }

    let mut demand = vec![0 as IntType; dimension];
    if let Some(rows) = raw.sections.get("DEMAND_SECTION") {
        for row in rows {
            let idx: usize = row[0].parse::<usize>()? - 1;
            demand[idx] = row[1].parse()?;
        }
    }

    let mut pickup = vec![0 as IntType; dimension];
    if let Some(rows) = raw.sections.get("BACKHAUL_SECTION") {
        for row in rows {
            let idx: usize = row[0].parse::<usize>()? - 1;
            pickup[idx] = row[1].parse()?;
        }
    }

    let mut service = vec![service_time_scalar; dimension];
    for loc in service.iter_mut().take(num_depots) {
        *loc = 0.0;
    }
    if let Some(rows) = raw.sections.get("SERVICE_TIME_SECTION") {
        for row in rows {
            let idx: usize = row[0].parse::<usize>()? - 1;
            service[idx] = row[1].parse()?;
        }
    }

    let mut tw_early = vec![0 as IntType; dimension];
    let mut tw_late = vec![MAX_VALUE; dimension];
    if let Some(rows) = raw.sections.get("TIME_WINDOW_SECTION") {
        for row in rows {
            let idx: usize = row[0].parse::<usize>()? - 1;
            tw_early[idx] = row[1].parse()?;
            tw_late[idx] = row[2].parse()?;
        }
    }

    let mut release_time = vec![0 as IntType; dimension];
    if let Some(rows) = raw.sections.get("RELEASE_TIME_SECTION") {
        for row in rows {
            let idx: usize = row[0].parse::<usize>()? - 1;
            release_time[idx] = row[1].parse()?;
        }
    }

    // A client listed in PRIZE_SECTION is treated as optional (prize-
    // collecting); everything else defaults to required. spec.md doesn't
    // pin down this mapping explicitly -- see DESIGN.md's Open Question
    // resolution.
    let mut prize = vec![0 as IntType; dimension];
    let mut has_prize_entry = vec![false; dimension];
    if let Some(rows) = raw.sections.get("PRIZE_SECTION") {
        for row in rows {
            let idx: usize = row[0].parse::<usize>()? - 1;
            prize[idx] = row[1].parse()?;
            has_prize_entry[idx] = true;
        }
    }

    let mut group_of: Vec<Option<usize>> = vec![None; dimension];
    let mut groups = Vec::new();
    if let Some(rows) = raw.sections.get("GROUPS_SECTION") {
        for row in rows {
            if row.is_empty() {
                continue;
            }
            let mutually_exclusive = match row[0].to_ascii_uppercase().as_str() {
                "EXCLUSIVE" | "M" => true,
                "INCLUSIVE" | "R" => false,
                other => bail!("unknown GROUPS_SECTION flag '{}'", other),
            };
            let members: Vec<usize> = row[1..]
                .iter()
                .map(|tok| tok.parse::<usize>().map(|v| v - 1))
                .collect::<std::result::Result<_, _>>()?;
            let group_index = groups.len();
            for &member in members.iter() {
                group_of[member] = Some(group_index);
            }
            groups.push(ClientGroup {
                members,
                mutually_exclusive,
            });
        }
    }

    // Base distance/duration profile (profile 0).
    let mut distance = Matrix::<IntType>::new(dimension, dimension);
    let is_explicit = edge_weight_type.eq_ignore_ascii_case("EXPLICIT");
    if is_explicit {
        let format = edge_weight_format.unwrap_or_else(|| "FULL_MATRIX".to_string());
        if !format.eq_ignore_ascii_case("FULL_MATRIX") {
            bail!("unsupported EDGE_WEIGHT_FORMAT '{}'", format);
        }
        let tokens: Vec<IntType> = raw
            .sections
            .get("EDGE_WEIGHT_SECTION")
            .map(|rows| {
                rows.iter()
                    .flat_map(|row| row.iter())
                    .map(|tok| tok.parse::<f64>().map(|v| round_func.apply(v)))
                    .collect::<std::result::Result<_, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        let mut idx = 0;
        for row in 0..dimension {
            for col in 0..dimension {
                let value = tokens.get(idx).copied().unwrap_or(MAX_VALUE);
                distance.set(row, col, if row == col { 0 } else { value });
                idx += 1;
            }
        }
    } else if edge_weight_type.eq_ignore_ascii_case("EUC_2D") {
        for row in 0..dimension {
            for col in 0..dimension {
                let value = if row == col {
                    0
                } else {
                    round_func.apply(euclidean(coords[row], coords[col]))
                };
                distance.set(row, col, value);
            }
        }
    } else {
        bail!("unsupported EDGE_WEIGHT_TYPE '{}'", edge_weight_type);
    }

    // No separate wire format for travel time is defined by spec.md §6.1;
    // duration defaults to distance (the common VRPLIB convention of unit
    // travel speed). See DESIGN.md's Open Question resolution.
    let mut duration = distance.clone();

    // Forbid backhaul-before-linehaul arcs: from a depot to a backhaul-
    // only client, and from any backhaul-only client to any linehaul-only
    // client.
    let is_backhaul_only =
        |i: usize| i >= num_depots && pickup[i] > 0 && demand[i] == 0;
    let is_linehaul_only =
        |i: usize| i >= num_depots && demand[i] > 0 && pickup[i] == 0;
    for i in 0..dimension {
        for j in 0..dimension {
            let forbidden =
                (i < num_depots && is_backhaul_only(j)) || (is_backhaul_only(i) && is_linehaul_only(j));
            if forbidden {
                distance.set(i, j, MAX_VALUE);
                duration.set(i, j, MAX_VALUE);
            }
        }
    }

    let mut profiles = vec![(distance, duration)];

    // Heterogeneous fleet table, or a single homogeneous vehicle type
    // derived from the VEHICLES/CAPACITY headers.
    let mut vehicle_types = Vec::new();
    if let Some(rows) = raw.sections.get("VEHICLES_SECTION") {
        for row in rows {
            if row.len() < 11 {
                bail!("VEHICLES_SECTION row has too few columns: {:?}", row);
            }
            let num_available: usize = row[0].parse()?;
            let capacity: IntType = row[1].parse()?;
            let start_depot: usize = row[2].parse::<usize>()? - 1;
            let end_depot: usize = row[3].parse::<usize>()? - 1;
            let fixed_cost: IntType = row[4].parse()?;
            let tw_early: IntType = row[5].parse()?;
            let tw_late: IntType = row[6].parse()?;
            let max_duration: IntType = row[7].parse()?;
            let max_distance: IntType = row[8].parse()?;
            let unit_distance_cost: f64 = row[9].parse()?;
            let unit_duration_cost: f64 = row[10].parse()?;
            let profile: usize = row.get(11).map(|v| v.parse()).transpose()?.unwrap_or(0);
            let name = row.get(12).cloned();

            vehicle_types.push(VehicleType {
                name,
                num_available,
                capacity,
                start_depot,
                end_depot,
                fixed_cost,
                unit_distance_cost,
                unit_duration_cost,
                tw_early,
                tw_late,
                max_duration,
                max_distance,
                profile,
            });
        }
    } else {
        let num_available: usize = raw
            .headers
            .get("VEHICLES")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(dimension.saturating_sub(num_depots).max(1));
        let capacity: IntType = raw
            .headers
            .get("CAPACITY")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(MAX_VALUE);

        vehicle_types.push(VehicleType {
            name: None,
            num_available,
            capacity,
            start_depot: 0,
            end_depot: 0,
            fixed_cost: 0,
            unit_distance_cost: 1.0,
            unit_duration_cost: 0.0,
            tw_early: tw_early.first().copied().unwrap_or(0),
            tw_late: tw_late.first().copied().unwrap_or(MAX_VALUE),
            max_duration: MAX_VALUE,
            max_distance: MAX_VALUE,
            profile: 0,
        });
    }

    // Per-vehicle-type client whitelists become distinct routing profiles
    // whose matrices replace disallowed edges with MAX_VALUE.
    if let Some(rows) = raw.sections.get("ALLOWED_CLIENTS_SECTION") {
        for row in rows {
            if row.is_empty() {
                continue;
            }
            let vt_index: usize = row[0].parse::<usize>()? - 1;
            let allowed: HashSet<usize> = row[1..]
                .iter()
                .map(|tok| tok.parse::<usize>().map(|v| v - 1))
                .collect::<std::result::Result<_, _>>()?;

            let vt = vehicle_types
                .get(vt_index)
                .ok_or_else(|| anyhow!("ALLOWED_CLIENTS_SECTION references unknown vehicle type {}", vt_index + 1))?;
            let base = vt.profile;
            let (mut dist, mut dur) = profiles[base].clone();
            for to in num_depots..dimension {
                if allowed.contains(&to) {
                    continue;
                }
                for from in 0..dimension {
                    dist.set(from, to, MAX_VALUE);
                    dur.set(from, to, MAX_VALUE);
                }
            }
            let new_profile = profiles.len();
            profiles.push((dist, dur));
            vehicle_types[vt_index].profile = new_profile;
        }
    }

    let mut builder = ProblemDataBuilder::new();
    for index in 0..dimension {
        let location = Location {
            coord: coords[index],
            demand: demand[index],
            pickup: pickup[index],
            service_duration: round_func.apply(service[index]),
            tw_early: tw_early[index],
            tw_late: tw_late[index],
            release_time: release_time[index],
            prize: prize[index],
            required: index >= num_depots && !has_prize_entry[index],
            group: group_of[index],
        };
        if index < num_depots {
            builder.add_depot(location);
        } else {
            builder.add_client(location);
        }
    }
    for (dist, dur) in profiles {
        builder.add_profile(dist, dur);
    }
    for vt in vehicle_types {
        builder.add_vehicle_type(vt);
    }
    for group in groups {
        builder.add_group(group);
    }

    builder.build().map_err(|e| anyhow!(e.to_string()))
}
