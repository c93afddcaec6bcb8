//! Build controllers from engine catalogs.

use emr_config::{ConfigError, EngineConfig};
use emr_controller_core::{ControllerError, EmrController, EngineState};
use emr_mixture::{MixtureError, MixtureStore};
use log::debug;
use thiserror::Error;

/// Errors surfaced when selecting or converting engines.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine '{0}' not found in catalog")]
    NotFound(String),
    #[error("engine catalog is empty")]
    EmptyCatalog,
    #[error("engine '{engine}' has invalid configuration: {source}")]
    Config {
        engine: String,
        #[source]
        source: ConfigError,
    },
    #[error("engine '{engine}' has invalid mixture calibration: {source}")]
    Mixture {
        engine: String,
        #[source]
        source: MixtureError,
    },
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// Select an engine by case-insensitive name, defaulting to the first entry.
pub fn select<'a>(
    configs: &'a [EngineConfig],
    requested: Option<&str>,
) -> Result<&'a EngineConfig, EngineError> {
    if configs.is_empty() {
        return Err(EngineError::EmptyCatalog);
    }
    match requested {
        Some(name) => {
            let upper = name.to_uppercase();
            configs
                .iter()
                .find(|cfg| cfg.name.to_uppercase() == upper)
                .ok_or_else(|| EngineError::NotFound(name.to_string()))
        }
        None => Ok(&configs[0]),
    }
}

/// In-memory engine carrying the configuration's stock propellant ratios.
pub fn engine_state(config: &EngineConfig) -> EngineState {
    EngineState::new(config.channels(), config.densities())
}

pub fn mixture_store(config: &EngineConfig) -> Result<MixtureStore, EngineError> {
    let records = config.mixture_records().map_err(|source| EngineError::Config {
        engine: config.name.clone(),
        source,
    })?;
    MixtureStore::build(records).map_err(|source| EngineError::Mixture {
        engine: config.name.clone(),
        source,
    })
}

/// Controller attached to a fresh engine state, with `config_name` (or the first calibrated
/// configuration) selected.
pub fn controller_for(
    config: &EngineConfig,
    config_name: Option<&str>,
) -> Result<(EmrController, EngineState), EngineError> {
    let store = mixture_store(config)?;
    let state = engine_state(config);
    let selected = match config_name {
        Some(name) => name.to_string(),
        None => store.config_names().next().unwrap_or_default().to_string(),
    };

    let mut controller = EmrController::new(store);
    controller.attach(&state)?;
    controller.select_config(&selected);
    debug!("controller for '{}' using configuration '{selected}'", config.name);
    Ok((controller, state))
}
