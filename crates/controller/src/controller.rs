//! The per-engine controller state machine.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use emr_core::constants::RATIO_TOLERANCE;
use emr_core::math::approx_eq;
use emr_mixture::{MixtureRecord, MixtureRecordPair, MixtureStore, interpolate_clamped};
use emr_propellant::{
    ClampedRatio, OxidizerSelection, PropellantResourceSet, Surplus, clamp_to_envelope,
    compute_ratios, estimate_reserves, solve_optimal_ratio,
};
use log::{debug, info};
use serde::Serialize;

use crate::display::{describe_record, optimal_text, reserve_report_text, reserve_text};
use crate::host::{EngineSubsystem, Telemetry, ThrustConfigurationAdapter};
use crate::ControllerError;

/// Editor reserve slider range, percent.
const RESERVE_LIMIT_PERCENT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControlMode {
    /// Engine keeps its stock configuration.
    Disabled,
    /// Pre-flight: blend between starting and final ratio.
    Editing,
    /// In flight, steering to the ratio that empties all tanks together.
    ClosedLoop,
    /// In flight, holding the manually set current ratio.
    OpenLoop,
}

/// Host-settable scalar inputs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ControlInputs {
    pub starting_emr: f64,
    pub final_emr: f64,
    pub current_emr: f64,
    /// Share of the burn spent at `final_emr`, 0..=100.
    pub blend_percent: f64,
    /// Boiloff reserve, -50..=50. Positive shrinks the oxidizer allotment (fuel-rich),
    /// negative shrinks the fuel allotments (oxidizer-rich).
    pub reserve_percent: f64,
}

/// What was written to the engine by [`EmrController::apply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedMixture {
    pub emr: f64,
    pub record: MixtureRecord,
    pub ratios: BTreeMap<i32, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum OptimalRatio {
    Unknown,
    Known(ClampedRatio),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReserveReport {
    Unknown,
    Balanced,
    Surplus(Vec<Surplus>),
}

/// Snapshot of everything the host displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerStatus {
    pub config_name: String,
    pub mode: ControlMode,
    pub inputs: ControlInputs,
    pub ratio_range: Option<(f64, f64)>,
    pub oxidizer_selection: Option<OxidizerSelection>,
    pub starting_text: Option<String>,
    pub final_text: Option<String>,
    pub reserve_setting_text: String,
    pub optimal: OptimalRatio,
    pub optimal_text: String,
    pub reserves: ReserveReport,
    pub reserve_text: String,
}

pub struct EmrController {
    store: MixtureStore,
    resources: Option<PropellantResourceSet>,
    config_name: String,
    mode: ControlMode,
    inputs: ControlInputs,
    last_applied_emr: Option<f64>,
    adapter: Option<Arc<dyn ThrustConfigurationAdapter>>,
    adapter_updating: AtomicBool,
}

impl EmrController {
    pub fn new(store: MixtureStore) -> Self {
        let mut controller = Self {
            store,
            resources: None,
            config_name: String::new(),
            mode: ControlMode::Disabled,
            inputs: ControlInputs::default(),
            last_applied_emr: None,
            adapter: None,
            adapter_updating: AtomicBool::new(false),
        };
        controller.select_config("");
        controller
    }

    /// Let `adapter` own the configuration name and receive min-thrust updates.
    pub fn with_adapter(mut self, adapter: Arc<dyn ThrustConfigurationAdapter>) -> Self {
        let name = adapter.current_configuration_name();
        self.adapter = Some(adapter);
        self.select_config(&name);
        self
    }

    /// Classify the engine's propellants. Must be called before applying.
    pub fn attach(&mut self, engine: &dyn EngineSubsystem) -> Result<(), ControllerError> {
        let resources = PropellantResourceSet::build(
            &engine.propellant_channels(),
            &engine.resource_densities(),
        )?;
        self.resources = Some(resources);
        self.last_applied_emr = None;
        Ok(())
    }

    pub fn store(&self) -> &MixtureStore {
        &self.store
    }

    pub fn resources(&self) -> Option<&PropellantResourceSet> {
        self.resources.as_ref()
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    pub fn active_pair(&self) -> &MixtureRecordPair {
        self.store.lookup(&self.config_name)
    }

    /// Switch configuration, resetting every ratio input to the high calibration ratio.
    pub fn select_config(&mut self, name: &str) {
        self.config_name = name.to_string();
        self.last_applied_emr = None;
        if let Some((_, max)) = self.active_pair().range() {
            self.inputs.starting_emr = max;
            self.inputs.final_emr = max;
            self.inputs.current_emr = max;
            debug!("selected configuration '{name}'");
        } else {
            debug!("configuration '{name}' has no mixture calibration");
        }
    }

    /// Follow the adapter's configuration name. Returns true when it changed.
    pub fn sync_adapter_config(&mut self) -> bool {
        let Some(name) = self.adapter.as_ref().map(|a| a.current_configuration_name()) else {
            return false;
        };
        if name == self.config_name {
            return false;
        }
        info!("configuration changed to '{name}'");
        self.select_config(&name);
        true
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ControlMode) {
        if mode != self.mode {
            self.last_applied_emr = None;
        }
        self.mode = mode;
    }

    /// Enable/disable toggle; enabling enters [`ControlMode::Editing`].
    pub fn toggle(&mut self) -> ControlMode {
        let next = match self.mode {
            ControlMode::Disabled => ControlMode::Editing,
            _ => ControlMode::Disabled,
        };
        self.set_mode(next);
        next
    }

    pub fn inputs(&self) -> ControlInputs {
        self.inputs
    }

    pub fn set_starting_emr(&mut self, emr: f64) {
        let emr = self.active_pair().clamp_ratio(emr);
        self.update_inputs(|inputs| inputs.starting_emr = emr);
    }

    pub fn set_final_emr(&mut self, emr: f64) {
        let emr = self.active_pair().clamp_ratio(emr);
        self.update_inputs(|inputs| inputs.final_emr = emr);
    }

    pub fn set_current_emr(&mut self, emr: f64) {
        let emr = self.active_pair().clamp_ratio(emr);
        self.update_inputs(|inputs| inputs.current_emr = emr);
    }

    pub fn set_blend_percent(&mut self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0);
        self.update_inputs(|inputs| inputs.blend_percent = percent);
    }

    pub fn set_reserve_percent(&mut self, percent: f64) {
        let percent = percent.clamp(-RESERVE_LIMIT_PERCENT, RESERVE_LIMIT_PERCENT);
        self.update_inputs(|inputs| inputs.reserve_percent = percent);
    }

    // Any input change invalidates what was last written, so the next closed-loop tick applies.
    fn update_inputs(&mut self, change: impl FnOnce(&mut ControlInputs)) {
        let before = self.inputs;
        change(&mut self.inputs);
        if self.inputs != before {
            self.last_applied_emr = None;
        }
    }

    pub fn last_applied_emr(&self) -> Option<f64> {
        self.last_applied_emr
    }

    /// Ratio the engine's thrust and curve are configured for in the current mode.
    pub fn effective_emr(&self) -> f64 {
        match self.mode {
            ControlMode::Editing | ControlMode::Disabled => self.inputs.starting_emr,
            ControlMode::ClosedLoop | ControlMode::OpenLoop => self.inputs.current_emr,
        }
    }

    /// Propellant ratios for the current mode and inputs.
    pub fn target_ratios(&self) -> Result<BTreeMap<i32, f64>, ControllerError> {
        let resources = self.resources.as_ref().ok_or(ControllerError::NotAttached)?;
        let ControlInputs {
            starting_emr,
            final_emr,
            current_emr,
            blend_percent,
            reserve_percent,
        } = self.inputs;
        let ratios = match self.mode {
            ControlMode::Editing | ControlMode::Disabled => compute_ratios(
                resources,
                starting_emr,
                final_emr,
                blend_percent,
                reserve_percent,
            ),
            ControlMode::ClosedLoop | ControlMode::OpenLoop => {
                compute_ratios(resources, current_emr, current_emr, 0.0, reserve_percent)
            }
        };
        Ok(ratios)
    }

    /// Blended record for `emr` within the active configuration.
    pub fn record_for(&self, emr: f64) -> Result<MixtureRecord, ControllerError> {
        Ok(interpolate_clamped(self.active_pair(), emr)?)
    }

    /// Write ratios, response curve, and thrust bounds for the current mode to `engine`.
    ///
    /// Returns `None` when disabled or when the active configuration has no calibration.
    pub fn apply(
        &mut self,
        engine: &mut dyn EngineSubsystem,
    ) -> Result<Option<AppliedMixture>, ControllerError> {
        self.sync_adapter_config();
        if self.mode == ControlMode::Disabled || self.active_pair().is_disabled() {
            return Ok(None);
        }

        let emr = self.effective_emr();
        let record = self.record_for(emr)?;
        let ratios = self.target_ratios()?;

        for (&id, &ratio) in &ratios {
            engine.set_propellant_ratio(id, ratio);
        }
        engine.set_response_curve(record.curve.clone());
        engine.set_thrust_bounds(record.min_thrust, record.max_thrust);
        self.push_min_thrust(record.min_thrust);
        self.last_applied_emr = Some(emr);

        debug!(
            "applied EMR {emr:.3} to '{}' ({:.1}-{:.1} kN)",
            self.config_name, record.min_thrust, record.max_thrust
        );
        Ok(Some(AppliedMixture {
            emr,
            record,
            ratios,
        }))
    }

    /// Closed-loop tick: steer to the optimal ratio, skipping when it has not moved.
    pub fn update_closed_loop(
        &mut self,
        engine: &mut dyn EngineSubsystem,
        telemetry: &dyn Telemetry,
    ) -> Result<Option<AppliedMixture>, ControllerError> {
        if self.mode != ControlMode::ClosedLoop {
            return Ok(None);
        }
        self.sync_adapter_config();
        let OptimalRatio::Known(optimal) = self.optimal_ratio(telemetry) else {
            return Ok(None);
        };
        if self
            .last_applied_emr
            .is_some_and(|last| approx_eq(last, optimal.ratio, RATIO_TOLERANCE))
        {
            return Ok(None);
        }
        self.inputs.current_emr = optimal.ratio;
        self.apply(engine)
    }

    /// Ratio that empties oxidizer and fuel together, clamped to the calibrated envelope.
    pub fn optimal_ratio(&self, telemetry: &dyn Telemetry) -> OptimalRatio {
        let (Some(resources), Some(envelope)) = (&self.resources, self.active_pair().range())
        else {
            return OptimalRatio::Unknown;
        };
        let Some(oxidizer) = telemetry.remaining_amount(resources.oxidizer().id) else {
            return OptimalRatio::Unknown;
        };
        let fuel: Option<f64> = resources
            .fuels()
            .map(|f| telemetry.remaining_amount(f.id).map(|r| r.amount))
            .sum();
        let Some(fuel) = fuel else {
            return OptimalRatio::Unknown;
        };

        let raw = solve_optimal_ratio(resources, oxidizer.amount, fuel, envelope);
        OptimalRatio::Known(clamp_to_envelope(raw, envelope))
    }

    /// Surplus propellant at the current ratios.
    pub fn reserve_report(&self, telemetry: &dyn Telemetry) -> ReserveReport {
        let Some(resources) = &self.resources else {
            return ReserveReport::Unknown;
        };
        let remaining: Option<BTreeMap<i32, f64>> = resources
            .resources()
            .iter()
            .map(|r| telemetry.remaining_amount(r.id).map(|a| (r.id, a.amount)))
            .collect();
        let Some(remaining) = remaining else {
            return ReserveReport::Unknown;
        };

        let active = match self.target_ratios() {
            Ok(ratios) if self.mode != ControlMode::Disabled => resources.with_ratios(&ratios),
            _ => resources.clone(),
        };
        let surplus = estimate_reserves(&remaining, &active);
        if surplus.is_empty() {
            ReserveReport::Balanced
        } else {
            ReserveReport::Surplus(surplus)
        }
    }

    /// Forward `min_thrust` to the adapter unless a push is already in progress on this
    /// controller. Returns whether the adapter was called.
    pub fn push_min_thrust(&self, min_thrust: f64) -> bool {
        let Some(adapter) = &self.adapter else {
            return false;
        };
        if self
            .adapter_updating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        adapter.apply_min_thrust(min_thrust);
        self.adapter_updating.store(false, Ordering::Release);
        true
    }

    /// True while this controller is pushing into the adapter; hosts use it to ignore the
    /// adapter's own change notification.
    pub fn is_updating_adapter(&self) -> bool {
        self.adapter_updating.load(Ordering::Acquire)
    }

    pub fn status(&self, telemetry: &dyn Telemetry) -> ControllerStatus {
        let pair = self.active_pair();
        let describe = |emr: f64| {
            interpolate_clamped(pair, emr)
                .ok()
                .map(|record| describe_record(&record))
        };
        let optimal = self.optimal_ratio(telemetry);
        let reserves = self.reserve_report(telemetry);

        ControllerStatus {
            config_name: self.config_name.clone(),
            mode: self.mode,
            inputs: self.inputs,
            ratio_range: pair.range(),
            oxidizer_selection: self.resources.as_ref().map(|r| r.oxidizer_selection()),
            starting_text: describe(self.inputs.starting_emr),
            final_text: describe(self.inputs.final_emr),
            reserve_setting_text: reserve_text(self.inputs.reserve_percent),
            optimal_text: optimal_text(&optimal),
            optimal,
            reserve_text: reserve_report_text(&reserves),
            reserves,
        }
    }
}
