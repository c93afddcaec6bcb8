//! Piecewise-Hermite response curves (efficiency vs. ambient pressure) and the blender that
//! produces intermediate curves between two calibrations.

pub mod blend;

pub use blend::{CurveError, blend};

use serde::{Deserialize, Serialize};

/// One control point of a [`KeyframeCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f64,
    pub value: f64,
    pub in_slope: f64,
    pub out_slope: f64,
}

impl Keyframe {
    pub fn new(time: f64, value: f64, in_slope: f64, out_slope: f64) -> Self {
        Self {
            time,
            value,
            in_slope,
            out_slope,
        }
    }
}

/// Ordered sequence of keyframes evaluated with cubic Hermite segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyframeCurve {
    keys: Vec<Keyframe>,
}

impl KeyframeCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from keys, ordering them by time.
    pub fn from_keys<I: IntoIterator<Item = Keyframe>>(keys: I) -> Self {
        let mut curve = Self::new();
        for key in keys {
            curve.insert(key);
        }
        curve
    }

    // Keys are taken in the given order, even if their times are not ascending.
    pub(crate) fn from_ordered(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    /// Add a flat key (zero slopes).
    pub fn add(&mut self, time: f64, value: f64) -> &mut Self {
        self.add_with_slopes(time, value, 0.0, 0.0)
    }

    pub fn add_with_slopes(
        &mut self,
        time: f64,
        value: f64,
        in_slope: f64,
        out_slope: f64,
    ) -> &mut Self {
        self.insert(Keyframe::new(time, value, in_slope, out_slope));
        self
    }

    // Keys with equal times keep insertion order.
    fn insert(&mut self, key: Keyframe) {
        let index = self.keys.partition_point(|k| k.time <= key.time);
        self.keys.insert(index, key);
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn min_time(&self) -> Option<f64> {
        self.keys.first().map(|k| k.time)
    }

    pub fn max_time(&self) -> Option<f64> {
        self.keys.last().map(|k| k.time)
    }

    /// Evaluate the curve at `time`.
    ///
    /// Outside the key range the curve holds the first/last value. An empty curve evaluates
    /// to zero.
    pub fn evaluate(&self, time: f64) -> f64 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let upper = self.keys.partition_point(|k| k.time <= time);
        let k0 = &self.keys[upper - 1];
        let k1 = &self.keys[upper];
        let dt = k1.time - k0.time;
        if dt <= 0.0 {
            return k1.value;
        }

        let s = (time - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * k0.value + h10 * k0.out_slope * dt + h01 * k1.value + h11 * k1.in_slope * dt
    }
}
