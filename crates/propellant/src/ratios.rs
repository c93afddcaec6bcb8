//! Convert an oxidizer:fuel mass ratio into the volumetric propellant ratios an engine burns.

use std::collections::BTreeMap;

use emr_core::math::lerp;

use crate::PropellantResourceSet;

/// Volumetric ratios that realise `emr` with the calibrated fuel flow.
///
/// The oxidizer is always present. A single fuel channel is included as well; with several
/// fuels only the oxidizer is returned and the fuels keep their calibrated ratios.
pub fn ratios_for_emr(resources: &PropellantResourceSet, emr: f64) -> BTreeMap<i32, f64> {
    let fuel_mass_flow = resources.fuel_mass_flow();
    let oxidizer = resources.oxidizer();
    let oxidizer_mass_flow = fuel_mass_flow * emr;

    let mut ratios = BTreeMap::from([(oxidizer.id, oxidizer_mass_flow / oxidizer.density)]);
    let mut fuels = resources.fuels();
    if let (Some(fuel), None) = (fuels.next(), fuels.next()) {
        ratios.insert(fuel.id, fuel_mass_flow / fuel.density);
    }
    ratios
}

/// Ratio for every channel after blending between `starting_emr` and `final_emr` and applying
/// the boiloff reserve skew.
///
/// `blend_percent` is the share (0..=100) of the burn spent at `final_emr`. A positive
/// `reserve_percent` shrinks the oxidizer allotment (fuel-rich reserve); a negative one shrinks
/// every fuel allotment (oxidizer-rich reserve).
pub fn compute_ratios(
    resources: &PropellantResourceSet,
    starting_emr: f64,
    final_emr: f64,
    blend_percent: f64,
    reserve_percent: f64,
) -> BTreeMap<i32, f64> {
    let start = ratios_for_emr(resources, starting_emr);
    let end = ratios_for_emr(resources, final_emr);
    let fraction = blend_percent / 100.0;

    resources
        .resources()
        .iter()
        .map(|resource| {
            let mut ratio = match (start.get(&resource.id), end.get(&resource.id)) {
                (Some(&a), Some(&b)) => lerp(a, b, fraction),
                _ => resource.ratio,
            };
            let is_oxidizer = resources.is_oxidizer(resource.id);
            if reserve_percent > 0.0 && is_oxidizer {
                ratio *= (100.0 - reserve_percent) / 100.0;
            }
            if reserve_percent < 0.0 && !is_oxidizer {
                ratio *= (100.0 + reserve_percent) / 100.0;
            }
            (resource.id, ratio)
        })
        .collect()
}
