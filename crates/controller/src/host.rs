//! Interfaces to the hosting environment.

use std::collections::BTreeMap;

use emr_curve::KeyframeCurve;
use emr_propellant::PropellantChannel;
use serde::Serialize;

/// Remaining quantity of one resource across everything the engine can draw from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceAmount {
    pub amount: f64,
    pub capacity: f64,
}

/// The engine the controller drives.
pub trait EngineSubsystem {
    fn propellant_channels(&self) -> Vec<PropellantChannel>;
    fn resource_densities(&self) -> BTreeMap<i32, f64>;
    fn set_propellant_ratio(&mut self, id: i32, ratio: f64);
    fn set_response_curve(&mut self, curve: KeyframeCurve);
    fn set_thrust_bounds(&mut self, min_thrust: f64, max_thrust: f64);
}

/// Remaining propellant query. `None` means the host cannot currently report the channel.
pub trait Telemetry {
    fn remaining_amount(&self, channel_id: i32) -> Option<ResourceAmount>;
}

impl Telemetry for BTreeMap<i32, ResourceAmount> {
    fn remaining_amount(&self, channel_id: i32) -> Option<ResourceAmount> {
        self.get(&channel_id).copied()
    }
}

/// Optional engine-configuration switcher that owns the active configuration name.
pub trait ThrustConfigurationAdapter: Send + Sync {
    fn current_configuration_name(&self) -> String;
    fn apply_min_thrust(&self, min_thrust: f64);
}

/// In-memory engine used by the command-line tools and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineState {
    pub channels: Vec<PropellantChannel>,
    pub densities: BTreeMap<i32, f64>,
    pub curve: KeyframeCurve,
    pub min_thrust: f64,
    pub max_thrust: f64,
}

impl EngineState {
    pub fn new(channels: Vec<PropellantChannel>, densities: BTreeMap<i32, f64>) -> Self {
        Self {
            channels,
            densities,
            curve: KeyframeCurve::new(),
            min_thrust: 0.0,
            max_thrust: 0.0,
        }
    }

    pub fn ratio(&self, id: i32) -> Option<f64> {
        self.channels.iter().find(|c| c.id == id).map(|c| c.ratio)
    }
}

impl EngineSubsystem for EngineState {
    fn propellant_channels(&self) -> Vec<PropellantChannel> {
        self.channels.clone()
    }

    fn resource_densities(&self) -> BTreeMap<i32, f64> {
        self.densities.clone()
    }

    fn set_propellant_ratio(&mut self, id: i32, ratio: f64) {
        if let Some(channel) = self.channels.iter_mut().find(|c| c.id == id) {
            channel.ratio = ratio;
        }
    }

    fn set_response_curve(&mut self, curve: KeyframeCurve) {
        self.curve = curve;
    }

    fn set_thrust_bounds(&mut self, min_thrust: f64, max_thrust: f64) {
        self.min_thrust = min_thrust;
        self.max_thrust = max_thrust;
    }
}
