//! Blend a configuration's low/high calibration records at an arbitrary ratio.

use emr_core::math::{inverse_lerp, lerp};
use emr_curve::blend;

use crate::{MixtureError, MixtureRecord, MixtureRecordPair};

/// Interpolated record at `target_ratio`, which must lie within the pair's range.
///
/// Exact boundary ratios return a copy of the stored record, so a degenerate pair
/// (`low.ratio == high.ratio`) still answers queries at its single ratio.
pub fn interpolate(
    pair: &MixtureRecordPair,
    target_ratio: f64,
) -> Result<MixtureRecord, MixtureError> {
    let (low, high) = pair.bounds()?;
    if target_ratio == low.ratio {
        return Ok(low.clone());
    }
    if target_ratio == high.ratio {
        return Ok(high.clone());
    }
    if low.ratio == high.ratio {
        return Err(MixtureError::DegenerateRange {
            name: pair.config_name().to_string(),
            ratio: low.ratio,
        });
    }
    if !(low.ratio..=high.ratio).contains(&target_ratio) {
        return Err(MixtureError::TargetOutOfRange {
            name: pair.config_name().to_string(),
            ratio: target_ratio,
            min: low.ratio,
            max: high.ratio,
        });
    }
    blend_records(low, high, target_ratio)
}

/// Like [`interpolate`], but clamps `target_ratio` into the pair's range first.
pub fn interpolate_clamped(
    pair: &MixtureRecordPair,
    target_ratio: f64,
) -> Result<MixtureRecord, MixtureError> {
    interpolate(pair, pair.clamp_ratio(target_ratio))
}

fn blend_records(
    low: &MixtureRecord,
    high: &MixtureRecord,
    target_ratio: f64,
) -> Result<MixtureRecord, MixtureError> {
    let fraction =
        inverse_lerp(low.ratio, high.ratio, target_ratio).ok_or_else(|| {
            MixtureError::DegenerateRange {
                name: high.name.clone(),
                ratio: high.ratio,
            }
        })?;

    Ok(MixtureRecord {
        name: high.name.clone(),
        ratio: target_ratio,
        min_thrust: lerp(low.min_thrust, high.min_thrust, fraction),
        max_thrust: lerp(low.max_thrust, high.max_thrust, fraction),
        curve: blend(&low.curve, &high.curve, fraction)?,
    })
}
