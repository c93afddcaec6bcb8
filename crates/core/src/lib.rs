//! Constants and small numeric helpers shared across the EMR controller workspace.

/// Tuning constants used by the mixture and propellant models.
pub mod constants {
    /// Surplus entries lighter than this (tonnes) are not reported.
    pub const RESERVE_MASS_EPSILON: f64 = 0.001;
    /// Case-insensitive name fragment used to break oxidizer mass-flow ties.
    pub const OXIDIZER_NAME_HINT: &str = "ox";
    /// Relative tolerance when comparing mass flows for a tie.
    pub const MASS_FLOW_TIE_TOLERANCE: f64 = 1.0e-9;
    /// Absolute tolerance for considering two mixture ratios equal.
    pub const RATIO_TOLERANCE: f64 = 1.0e-6;
    /// Knot times further apart than this are reported when blending curves.
    pub const KNOT_TIME_TOLERANCE: f64 = 1.0e-6;
    /// Kilonewtons to newtons.
    pub const KN_TO_N: f64 = 1_000.0;
}

/// Interpolation helpers.
pub mod math {
    /// Linear interpolation `a + t * (b - a)`, exact at both endpoints.
    ///
    /// `t` is not clamped.
    #[inline]
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        if t == 1.0 { b } else { a + t * (b - a) }
    }

    /// Position of `x` between `a` and `b` as a fraction. Returns `None` for an empty span.
    #[inline]
    pub fn inverse_lerp(a: f64, b: f64, x: f64) -> Option<f64> {
        let span = b - a;
        if span == 0.0 {
            None
        } else {
            Some((x - a) / span)
        }
    }

    /// Absolute-tolerance float comparison.
    #[inline]
    pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }
}

/// Human-readable unit formatting.
pub mod units {
    const PREFIXES: [&str; 5] = ["", "k", "M", "G", "T"];

    /// Format `value` with an SI prefix and the given number of significant figures,
    /// e.g. `format_si(65_000.0, 2, "N") == "65 kN"`.
    pub fn format_si(value: f64, sig_figs: usize, unit: &str) -> String {
        if value == 0.0 || !value.is_finite() {
            return format!("{value} {unit}");
        }
        let mut scaled = value;
        let mut index = 0;
        while scaled.abs() >= 1_000.0 && index + 1 < PREFIXES.len() {
            scaled /= 1_000.0;
            index += 1;
        }
        let magnitude = scaled.abs().log10().floor() as i64;
        let decimals = (sig_figs as i64 - 1 - magnitude).max(0) as usize;
        format!("{scaled:.decimals$} {}{unit}", PREFIXES[index])
    }
}
