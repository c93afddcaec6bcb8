//! Engine mixture ratio (EMR) controller library.
//!
//! Models a bipropellant engine whose oxidizer:fuel mass ratio can be varied between two
//! calibrated configurations. The member crates are re-exported here so front-ends (CLI, game
//! host bindings) only depend on this crate.

pub mod engine;

pub use emr_config as config;
pub use emr_controller_core as controller;
pub use emr_core as common;
pub use emr_curve as curve;
pub use emr_export as export;
pub use emr_mixture as mixture;
pub use emr_propellant as propellant;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
