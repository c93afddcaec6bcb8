//! Surplus propellant left over once the constraining channel runs dry.

use std::collections::BTreeMap;

use emr_core::constants::RESERVE_MASS_EPSILON;
use serde::Serialize;

use crate::PropellantResourceSet;

/// Propellant left in one channel when the first channel empties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surplus {
    pub id: i32,
    pub name: String,
    pub volume: f64,
    pub mass: f64,
}

/// Surplus per channel relative to the channel with the least burn time.
///
/// `remaining` maps channel id to remaining volume; channels missing from it or with a
/// non-positive ratio are ignored. An empty result means the tanks are balanced.
pub fn estimate_reserves(
    remaining: &BTreeMap<i32, f64>,
    resources: &PropellantResourceSet,
) -> Vec<Surplus> {
    let burn_times: Vec<_> = resources
        .resources()
        .iter()
        .filter(|r| r.ratio > 0.0)
        .filter_map(|r| remaining.get(&r.id).map(|&amount| (r, amount / r.ratio)))
        .collect();

    let min_time = burn_times
        .iter()
        .map(|(_, time)| *time)
        .fold(f64::INFINITY, f64::min);

    burn_times
        .into_iter()
        .filter(|(_, time)| *time - min_time > 0.0)
        .map(|(resource, time)| {
            let volume = (time - min_time) * resource.ratio;
            Surplus {
                id: resource.id,
                name: resource.name.clone(),
                volume,
                mass: volume * resource.density,
            }
        })
        .filter(|surplus| surplus.mass >= RESERVE_MASS_EPSILON)
        .collect()
}
