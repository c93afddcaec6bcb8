//! Propellant channels paired with their resource densities.

use std::collections::BTreeMap;

use emr_core::constants::{MASS_FLOW_TIE_TOLERANCE, OXIDIZER_NAME_HINT};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::PropellantError;

/// A propellant as the engine subsystem describes it: volumetric ratio per resource id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropellantChannel {
    pub id: i32,
    pub name: String,
    pub ratio: f64,
}

/// Own copy of a propellant channel plus its density, so derived ratios never touch the
/// engine's calibrated values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropellantResource {
    pub id: i32,
    pub name: String,
    pub ratio: f64,
    /// Tonnes per unit volume.
    pub density: f64,
}

impl PropellantResource {
    pub fn mass_flow(&self) -> f64 {
        self.density * self.ratio
    }
}

/// How the oxidizer channel was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OxidizerSelection {
    /// Single channel with the largest mass flow.
    Unique,
    /// Mass-flow tie broken by the oxidizer name hint.
    NameHint,
    /// Mass-flow tie with no name match; the first tied channel was taken.
    Ambiguous,
}

/// Ordered propellant resources classified into one oxidizer and one or more fuels.
///
/// Classification happens once in [`PropellantResourceSet::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct PropellantResourceSet {
    resources: Vec<PropellantResource>,
    oxidizer: usize,
    selection: OxidizerSelection,
}

impl PropellantResourceSet {
    pub fn build(
        channels: &[PropellantChannel],
        densities: &BTreeMap<i32, f64>,
    ) -> Result<Self, PropellantError> {
        let resources = channels
            .iter()
            .map(|channel| {
                let density = densities.get(&channel.id).copied().ok_or_else(|| {
                    PropellantError::MissingResource {
                        id: channel.id,
                        name: channel.name.clone(),
                    }
                })?;
                if !density.is_finite() || density < 0.0 {
                    return Err(PropellantError::InvalidDensity {
                        id: channel.id,
                        name: channel.name.clone(),
                        density,
                    });
                }
                if !channel.ratio.is_finite() || channel.ratio < 0.0 {
                    return Err(PropellantError::InvalidRatio {
                        id: channel.id,
                        name: channel.name.clone(),
                        ratio: channel.ratio,
                    });
                }
                Ok(PropellantResource {
                    id: channel.id,
                    name: channel.name.clone(),
                    ratio: channel.ratio,
                    density,
                })
            })
            .collect::<Result<Vec<_>, PropellantError>>()?;

        if resources.is_empty() {
            return Err(PropellantError::NoPropellants);
        }
        if resources.len() < 2 {
            return Err(PropellantError::NoFuel);
        }

        let (oxidizer, selection) = select_oxidizer(&resources);
        if selection == OxidizerSelection::Ambiguous {
            warn!(
                "ambiguous oxidizer: several propellants share the largest mass flow, using '{}'",
                resources[oxidizer].name
            );
        }
        info!(
            "built propellant set with {} channel(s), oxidizer '{}'",
            resources.len(),
            resources[oxidizer].name
        );

        Ok(Self {
            resources,
            oxidizer,
            selection,
        })
    }

    pub fn resources(&self) -> &[PropellantResource] {
        &self.resources
    }

    pub fn oxidizer(&self) -> &PropellantResource {
        &self.resources[self.oxidizer]
    }

    pub fn oxidizer_selection(&self) -> OxidizerSelection {
        self.selection
    }

    pub fn is_oxidizer(&self, id: i32) -> bool {
        self.oxidizer().id == id
    }

    /// Every non-oxidizer channel, in input order.
    pub fn fuels(&self) -> impl Iterator<Item = &PropellantResource> {
        self.resources
            .iter()
            .enumerate()
            .filter(move |(index, _)| *index != self.oxidizer)
            .map(|(_, resource)| resource)
    }

    pub fn get(&self, id: i32) -> Option<&PropellantResource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn ratio_total(&self) -> f64 {
        self.resources.iter().map(|r| r.ratio).sum()
    }

    pub fn fuel_mass_flow(&self) -> f64 {
        self.fuels().map(PropellantResource::mass_flow).sum()
    }

    /// Density of the combined fuel stream (fuel mass flow per unit fuel volume).
    pub fn average_fuel_density(&self) -> f64 {
        let volume: f64 = self.fuels().map(|f| f.ratio).sum();
        if volume == 0.0 {
            let count = self.fuels().count() as f64;
            return self.fuels().map(|f| f.density).sum::<f64>() / count;
        }
        self.fuel_mass_flow() / volume
    }

    /// Copy of this set with ratios replaced from `ratios`; classification is kept.
    pub fn with_ratios(&self, ratios: &BTreeMap<i32, f64>) -> Self {
        let mut copy = self.clone();
        for resource in &mut copy.resources {
            if let Some(&ratio) = ratios.get(&resource.id) {
                resource.ratio = ratio;
            }
        }
        copy
    }
}

fn select_oxidizer(resources: &[PropellantResource]) -> (usize, OxidizerSelection) {
    let max_flow = resources
        .iter()
        .map(PropellantResource::mass_flow)
        .fold(f64::NEG_INFINITY, f64::max);
    let tolerance = max_flow.abs() * MASS_FLOW_TIE_TOLERANCE;
    let tied: Vec<usize> = resources
        .iter()
        .enumerate()
        .filter(|(_, r)| max_flow - r.mass_flow() <= tolerance)
        .map(|(index, _)| index)
        .collect();

    if let [only] = tied.as_slice() {
        return (*only, OxidizerSelection::Unique);
    }
    let hinted = tied.iter().copied().find(|&index| {
        resources[index]
            .name
            .to_ascii_lowercase()
            .contains(OXIDIZER_NAME_HINT)
    });
    match hinted {
        Some(index) => (index, OxidizerSelection::NameHint),
        None => (tied.first().copied().unwrap_or(0), OxidizerSelection::Ambiguous),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: i32, name: &str, ratio: f64) -> PropellantChannel {
        PropellantChannel {
            id,
            name: name.into(),
            ratio,
        }
    }

    #[test]
    fn heavier_mass_flow_is_oxidizer_regardless_of_name() {
        let channels = [channel(0, "Oxidizer", 1.0), channel(1, "Fuel", 1.0)];
        let densities = BTreeMap::from([(0, 1.43), (1, 0.8)]);
        let set = PropellantResourceSet::build(&channels, &densities).unwrap();
        assert_eq!(set.oxidizer().id, 0);
        assert_eq!(set.oxidizer_selection(), OxidizerSelection::Unique);

        let swapped = [channel(0, "Oxidizer", 1.0), channel(1, "Fuel", 1.0)];
        let densities = BTreeMap::from([(0, 0.8), (1, 1.43)]);
        let set = PropellantResourceSet::build(&swapped, &densities).unwrap();
        assert_eq!(set.oxidizer().id, 1);
    }

    #[test]
    fn tie_is_broken_by_name_hint() {
        let channels = [channel(7, "LqdHydrogen", 1.0), channel(9, "LqdOxygen", 1.0)];
        let densities = BTreeMap::from([(7, 1.0), (9, 1.0)]);
        let set = PropellantResourceSet::build(&channels, &densities).unwrap();
        assert_eq!(set.oxidizer().id, 9);
        assert_eq!(set.oxidizer_selection(), OxidizerSelection::NameHint);
    }

    #[test]
    fn unresolved_tie_is_flagged_but_deterministic() {
        let channels = [channel(1, "Alpha", 2.0), channel(2, "Beta", 2.0)];
        let densities = BTreeMap::from([(1, 0.5), (2, 0.5)]);
        let set = PropellantResourceSet::build(&channels, &densities).unwrap();
        assert_eq!(set.oxidizer().id, 1);
        assert_eq!(set.oxidizer_selection(), OxidizerSelection::Ambiguous);
    }

    #[test]
    fn missing_density_is_an_error() {
        let channels = [channel(0, "Oxidizer", 1.0), channel(1, "Fuel", 1.0)];
        let densities = BTreeMap::from([(0, 1.43)]);
        assert_eq!(
            PropellantResourceSet::build(&channels, &densities),
            Err(PropellantError::MissingResource {
                id: 1,
                name: "Fuel".into()
            })
        );
    }

    #[test]
    fn non_finite_density_is_rejected() {
        let channels = [channel(0, "Oxidizer", 1.0), channel(1, "Fuel", 1.0)];
        let densities = BTreeMap::from([(0, f64::INFINITY), (1, f64::INFINITY)]);
        assert_eq!(
            PropellantResourceSet::build(&channels, &densities),
            Err(PropellantError::InvalidDensity {
                id: 0,
                name: "Oxidizer".into(),
                density: f64::INFINITY,
            })
        );
    }

    #[test]
    fn negative_ratio_is_rejected() {
        let channels = [channel(0, "Oxidizer", 1.0), channel(1, "Fuel", -0.5)];
        let densities = BTreeMap::from([(0, 1.0), (1, 1.0)]);
        assert!(matches!(
            PropellantResourceSet::build(&channels, &densities),
            Err(PropellantError::InvalidRatio { id: 1, .. })
        ));
    }

    #[test]
    fn single_channel_has_no_fuel() {
        let densities = BTreeMap::from([(0, 1.0)]);
        assert_eq!(
            PropellantResourceSet::build(&[channel(0, "Mono", 1.0)], &densities),
            Err(PropellantError::NoFuel)
        );
        assert_eq!(
            PropellantResourceSet::build(&[], &densities),
            Err(PropellantError::NoPropellants)
        );
    }

    #[test]
    fn derived_quantities_cover_all_fuels() {
        let channels = [
            channel(1, "Kerosene", 0.5),
            channel(2, "Oxidizer", 1.0),
            channel(3, "Ethanol", 0.5),
        ];
        let densities = BTreeMap::from([(1, 0.8), (2, 1.2), (3, 0.6)]);
        let set = PropellantResourceSet::build(&channels, &densities).unwrap();
        assert_eq!(set.oxidizer().id, 2);
        let fuel_ids: Vec<i32> = set.fuels().map(|f| f.id).collect();
        assert_eq!(fuel_ids, vec![1, 3]);
        assert!((set.ratio_total() - 2.0).abs() < 1e-12);
        assert!((set.fuel_mass_flow() - 0.7).abs() < 1e-12);
        assert!((set.average_fuel_density() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn with_ratios_keeps_classification() {
        let channels = [channel(0, "Oxidizer", 1.0), channel(1, "Fuel", 1.0)];
        let densities = BTreeMap::from([(0, 1.43), (1, 0.8)]);
        let set = PropellantResourceSet::build(&channels, &densities).unwrap();
        let shifted = set.with_ratios(&BTreeMap::from([(0, 0.1)]));
        assert_eq!(shifted.oxidizer().id, 0);
        assert_eq!(shifted.get(0).map(|r| r.ratio), Some(0.1));
        assert_eq!(set.get(0).map(|r| r.ratio), Some(1.0));
    }
}
