use emr_curve::KeyframeCurve;
use log::debug;
use serde::Serialize;

use crate::MixtureError;

/// One calibrated operating point of an engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixtureRecord {
    pub name: String,
    /// Oxidizer:fuel mass ratio, fuel normalised to 1.
    pub ratio: f64,
    /// Thrust bounds in kN.
    pub min_thrust: f64,
    pub max_thrust: f64,
    /// Specific impulse against ambient pressure (atm).
    pub curve: KeyframeCurve,
}

impl MixtureRecord {
    /// Vacuum specific impulse (curve value at zero pressure).
    pub fn vacuum_isp(&self) -> f64 {
        self.curve.evaluate(0.0)
    }
}

/// The two records bounding one configuration's ratio envelope.
///
/// A pair missing either record is disabled; callers check [`MixtureRecordPair::is_disabled`]
/// rather than handling an absent pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MixtureRecordPair {
    low: Option<MixtureRecord>,
    high: Option<MixtureRecord>,
}

impl MixtureRecordPair {
    /// Pair two records, assigning low/high by ascending ratio.
    pub fn new(a: MixtureRecord, b: MixtureRecord) -> Self {
        let (low, high) = if a.ratio < b.ratio { (a, b) } else { (b, a) };
        Self {
            low: Some(low),
            high: Some(high),
        }
    }

    pub fn from_parts(low: Option<MixtureRecord>, high: Option<MixtureRecord>) -> Self {
        if low.is_none() || high.is_none() {
            debug!("mixture pair is missing a record, disabling");
        }
        Self { low, high }
    }

    /// Sentinel for unknown configurations.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_disabled(&self) -> bool {
        self.low.is_none() || self.high.is_none()
    }

    pub fn low(&self) -> Option<&MixtureRecord> {
        self.low.as_ref()
    }

    pub fn high(&self) -> Option<&MixtureRecord> {
        self.high.as_ref()
    }

    /// Both records, or [`MixtureError::Disabled`].
    pub fn bounds(&self) -> Result<(&MixtureRecord, &MixtureRecord), MixtureError> {
        match (&self.low, &self.high) {
            (Some(low), Some(high)) => Ok((low, high)),
            _ => Err(MixtureError::Disabled),
        }
    }

    /// Configuration name, taken from the high record.
    pub fn config_name(&self) -> &str {
        self.high.as_ref().map(|r| r.name.as_str()).unwrap_or("")
    }

    /// `(low.ratio, high.ratio)` for an enabled pair.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.bounds().ok().map(|(low, high)| (low.ratio, high.ratio))
    }

    /// Clamp `ratio` into the pair's range. Disabled pairs return the input.
    pub fn clamp_ratio(&self, ratio: f64) -> f64 {
        match self.range() {
            Some((min, max)) => ratio.clamp(min, max),
            None => ratio,
        }
    }
}
