//! Propellant channels, oxidizer/fuel classification, and the ratio maths built on them.

pub mod optimal;
pub mod ratios;
pub mod reserve;
pub mod resources;

pub use optimal::{ClampedRatio, RatioClamp, clamp_to_envelope, solve_optimal_ratio};
pub use ratios::{compute_ratios, ratios_for_emr};
pub use reserve::{Surplus, estimate_reserves};
pub use resources::{OxidizerSelection, PropellantChannel, PropellantResource, PropellantResourceSet};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PropellantError {
    #[error("propellant '{name}' (id {id}) has no matching resource density")]
    MissingResource { id: i32, name: String },
    #[error("propellant '{name}' (id {id}) has invalid density {density}")]
    InvalidDensity { id: i32, name: String, density: f64 },
    #[error("propellant '{name}' (id {id}) has invalid ratio {ratio}")]
    InvalidRatio { id: i32, name: String, ratio: f64 },
    #[error("engine has no propellants")]
    NoPropellants,
    #[error("engine needs at least one fuel besides the oxidizer")]
    NoFuel,
}
