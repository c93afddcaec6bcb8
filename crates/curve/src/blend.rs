//! Positional blending of two calibration curves.
//!
//! Keys are matched by index, not by time: both curves must be authored with the same knot
//! placement. A mismatch in knot times is logged but still blended.

use emr_core::constants::KNOT_TIME_TOLERANCE;
use emr_core::math::lerp;
use log::warn;
use thiserror::Error;

use crate::{Keyframe, KeyframeCurve};

#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("cannot blend curves with {low} and {high} keys")]
    ShapeMismatch { low: usize, high: usize },
}

/// Blend `low` towards `high` by `fraction`, interpolating each key's four fields.
///
/// `fraction` is not clamped. Result key `i` comes from input keys `i` only, so keys keep their
/// positions even when extrapolated times cross.
pub fn blend(
    low: &KeyframeCurve,
    high: &KeyframeCurve,
    fraction: f64,
) -> Result<KeyframeCurve, CurveError> {
    if low.len() != high.len() {
        return Err(CurveError::ShapeMismatch {
            low: low.len(),
            high: high.len(),
        });
    }

    let mut mismatched_knots = 0usize;
    let keys: Vec<Keyframe> = low
        .keys()
        .iter()
        .zip(high.keys())
        .map(|(a, b)| {
            if (a.time - b.time).abs() > KNOT_TIME_TOLERANCE {
                mismatched_knots += 1;
            }
            Keyframe {
                time: lerp(a.time, b.time, fraction),
                value: lerp(a.value, b.value, fraction),
                in_slope: lerp(a.in_slope, b.in_slope, fraction),
                out_slope: lerp(a.out_slope, b.out_slope, fraction),
            }
        })
        .collect();

    if mismatched_knots > 0 {
        warn!("blending curves with {mismatched_knots} knot(s) at differing times");
    }

    Ok(KeyframeCurve::from_ordered(keys))
}
