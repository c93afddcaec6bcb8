//! Engine mixture ratio controller.
//!
//! [`EmrController`] ties a [`MixtureStore`](emr_mixture::MixtureStore) to one engine: it picks
//! the active configuration, interpolates thrust and response curve for the chosen ratio,
//! converts the ratio into propellant volumes, and in closed-loop mode steers towards the ratio
//! that empties every tank together. Host engines, telemetry, and the optional thrust
//! configuration adapter are reached through the traits in [`host`].

pub mod controller;
pub mod display;
pub mod host;

pub use controller::{
    AppliedMixture, ControlInputs, ControlMode, ControllerStatus, EmrController, OptimalRatio,
    ReserveReport,
};
pub use host::{EngineState, EngineSubsystem, ResourceAmount, Telemetry, ThrustConfigurationAdapter};

use emr_mixture::MixtureError;
use emr_propellant::PropellantError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("mixture model: {0}")]
    Mixture(#[from] MixtureError),
    #[error("propellants: {0}")]
    Propellant(#[from] PropellantError),
    #[error("controller is not attached to an engine")]
    NotAttached,
}
