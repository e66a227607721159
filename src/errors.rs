//! Typed domain errors raised while validating instance data and solver
//! parameters. I/O-facing callers (config loading, instance parsing) wrap
//! these with `anyhow::Context` rather than matching on variants.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VrpError {
    #[error("location {index}: tw_early ({early}) must be <= tw_late ({late})")]
    InvalidTimeWindow { index: usize, early: i64, late: i64 },

    #[error("location {index}: demand/pickup values must be non-negative")]
    NegativeDemand { index: usize },

    #[error("vehicle type {index}: depot index {depot} out of range (num_depots={num_depots})")]
    InvalidDepot {
        index: usize,
        depot: usize,
        num_depots: usize,
    },

    #[error("vehicle type {index}: profile index {profile} out of range (num_profiles={num_profiles})")]
    InvalidProfile {
        index: usize,
        profile: usize,
        num_profiles: usize,
    },

    #[error("vehicle type {index}: num_available must be > 0")]
    NoAvailableVehicles { index: usize },

    #[error("client group {index}: required client {client} cannot belong to a mutually exclusive group")]
    RequiredClientInExclusiveGroup { index: usize, client: usize },

    #[error("client group {index}: member index {client} out of range (num_locations={num_locations})")]
    InvalidGroupMember {
        index: usize,
        client: usize,
        num_locations: usize,
    },

    #[error("problem instance must contain at least one depot")]
    NoDepot,

    #[error("distance/duration matrix for profile {profile} has wrong dimensions: expected {expected}x{expected}, got {rows}x{cols}")]
    MatrixDimensionMismatch {
        profile: usize,
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("parameter {name} out of range: {value} (expected {constraint})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        constraint: &'static str,
    },

    #[error("failed to parse instance file: {0}")]
    ParseError(String),
}
