//! Mixture ratio that empties oxidizer and fuel at the same moment.

use serde::Serialize;

use crate::PropellantResourceSet;

/// Which envelope bound, if any, was applied to a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RatioClamp {
    None,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClampedRatio {
    pub ratio: f64,
    pub clamp: RatioClamp,
}

/// Optimal oxidizer:fuel mass ratio for the remaining propellant amounts.
///
/// `remaining_oxidizer` and `remaining_fuel` are resource amounts (volume); the fuel amount is
/// the total over all fuel channels. `envelope` is the calibrated `(min, max)` ratio. An empty
/// oxidizer tank favours the minimum ratio and an empty fuel tank the maximum. The result is
/// not clamped.
pub fn solve_optimal_ratio(
    resources: &PropellantResourceSet,
    remaining_oxidizer: f64,
    remaining_fuel: f64,
    envelope: (f64, f64),
) -> f64 {
    let (min, max) = envelope;
    if remaining_oxidizer == 0.0 {
        return min;
    }
    if remaining_fuel == 0.0 {
        return max;
    }
    (remaining_oxidizer * resources.oxidizer().density)
        / (remaining_fuel * resources.average_fuel_density())
}

/// Clamp `ratio` into `envelope`, recording which bound applied.
pub fn clamp_to_envelope(ratio: f64, envelope: (f64, f64)) -> ClampedRatio {
    let (min, max) = envelope;
    if ratio < min {
        ClampedRatio {
            ratio: min,
            clamp: RatioClamp::Min,
        }
    } else if ratio > max {
        ClampedRatio {
            ratio: max,
            clamp: RatioClamp::Max,
        }
    } else {
        ClampedRatio {
            ratio,
            clamp: RatioClamp::None,
        }
    }
}
