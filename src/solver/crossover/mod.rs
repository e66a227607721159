//! Crossover operators. Per spec.md §2, used by a population-based
//! variant the ILS driver does not require -- kept here as a standalone,
//! unit-tested library operator, not wired into `ils.rs`.

pub mod srex;

pub use self::srex::selective_route_exchange;
