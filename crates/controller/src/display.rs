//! Short status strings for editor and flight displays.

use emr_core::constants::KN_TO_N;
use emr_core::units::format_si;
use emr_mixture::MixtureRecord;
use emr_propellant::RatioClamp;

use crate::{OptimalRatio, ReserveReport};

/// `"{isp}s   Thrust: {thrust}"` for a record's vacuum ISP and maximum thrust.
pub fn describe_record(record: &MixtureRecord) -> String {
    format!(
        "{:.0}s   Thrust: {}",
        record.vacuum_isp(),
        format_si(record.max_thrust * KN_TO_N, 2, "N")
    )
}

/// Mixture bias of the boiloff reserve setting.
pub fn reserve_text(reserve_percent: f64) -> String {
    if reserve_percent == 0.0 {
        return "balanced".to_string();
    }
    let rich = if reserve_percent > 0.0 { "fuel-rich" } else { "oxidizer-rich" };
    format!("{}% {rich}", reserve_percent.abs())
}

pub fn optimal_text(optimal: &OptimalRatio) -> String {
    match optimal {
        OptimalRatio::Unknown => "unknown".to_string(),
        OptimalRatio::Known(clamped) => {
            let suffix = match clamped.clamp {
                RatioClamp::None => "",
                RatioClamp::Min => " (min)",
                RatioClamp::Max => " (max)",
            };
            format!("{:.2}:1{suffix}", clamped.ratio)
        }
    }
}

pub fn reserve_report_text(report: &ReserveReport) -> String {
    match report {
        ReserveReport::Unknown => "unknown".to_string(),
        ReserveReport::Balanced => "balanced".to_string(),
        ReserveReport::Surplus(entries) => entries
            .iter()
            .map(|s| format!("{}: {:.1} ({:.3}t)", s.name, s.volume, s.mass))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
