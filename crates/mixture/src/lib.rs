//! Calibrated mixture-ratio operating points and the interpolation between them.
//!
//! A [`MixtureStore`] maps each engine configuration name to the [`MixtureRecordPair`] that
//! bounds its operating envelope. [`interpolate`] produces a synthetic [`MixtureRecord`] for any
//! ratio inside that envelope.

pub mod codec;
pub mod interpolate;
pub mod record;
pub mod store;

pub use codec::CodecError;
pub use interpolate::{interpolate, interpolate_clamped};
pub use record::{MixtureRecord, MixtureRecordPair};
pub use store::MixtureStore;

use emr_curve::CurveError;
use thiserror::Error;

/// Errors raised while building a store or interpolating within a pair.
#[derive(Debug, Error, PartialEq)]
pub enum MixtureError {
    #[error("configuration '{name}' has {count} mixture records, expected exactly 2")]
    MalformedCalibration { name: String, count: usize },
    #[error("configuration '{name}' has identical low and high ratios ({ratio})")]
    DegenerateRange { name: String, ratio: f64 },
    #[error("ratio {ratio} is outside [{min}, {max}] for configuration '{name}'")]
    TargetOutOfRange {
        name: String,
        ratio: f64,
        min: f64,
        max: f64,
    },
    #[error("no mixture configuration is available")]
    Disabled,
    #[error("curve blend failed: {0}")]
    Curve(#[from] CurveError),
    #[error("compact encoding error: {0}")]
    Codec(#[from] CodecError),
}
