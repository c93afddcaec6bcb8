//! Engine definitions and mixture calibration loaders.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use emr_curve::KeyframeCurve;
use emr_mixture::MixtureRecord;
use emr_propellant::PropellantChannel;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

/// Engine definition: propellants, resource densities, and mixture calibration.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub name: String,
    pub propellants: Vec<PropellantConfig>,
    pub resources: Vec<ResourceConfig>,
    #[serde(default)]
    pub mixtures: Vec<MixtureConfig>,
}

/// Propellant entry with its volumetric ratio.
#[derive(Debug, Deserialize, Clone)]
pub struct PropellantConfig {
    pub id: i32,
    pub name: String,
    pub ratio: f64,
}

/// Resource definition supplying density (tonnes per unit).
#[derive(Debug, Deserialize, Clone)]
pub struct ResourceConfig {
    pub id: i32,
    pub name: String,
    pub density: f64,
}

/// One calibrated mixture point.
#[derive(Debug, Deserialize, Clone)]
pub struct MixtureConfig {
    #[serde(default, alias = "configName")]
    pub config_name: String,
    pub ratio: f64,
    #[serde(default, alias = "minThrust")]
    pub min_thrust: f64,
    #[serde(alias = "maxThrust")]
    pub max_thrust: f64,
    /// Keys as `[time, value]` or `[time, value, in_slope, out_slope]`.
    #[serde(default, alias = "atmosphereCurve")]
    pub atmosphere_curve: Vec<Vec<f64>>,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("mixture '{config}' curve key {index} has {len} value(s), expected 2 or 4")]
    InvalidKey {
        config: String,
        index: usize,
        len: usize,
    },
}

impl MixtureConfig {
    pub fn to_record(&self) -> Result<MixtureRecord, ConfigError> {
        let mut curve = KeyframeCurve::new();
        for (index, key) in self.atmosphere_curve.iter().enumerate() {
            match key.as_slice() {
                [time, value] => curve.add(*time, *value),
                [time, value, in_slope, out_slope] => {
                    curve.add_with_slopes(*time, *value, *in_slope, *out_slope)
                }
                _ => {
                    return Err(ConfigError::InvalidKey {
                        config: self.config_name.clone(),
                        index,
                        len: key.len(),
                    });
                }
            };
        }
        Ok(MixtureRecord {
            name: self.config_name.clone(),
            ratio: self.ratio,
            min_thrust: self.min_thrust,
            max_thrust: self.max_thrust,
            curve,
        })
    }
}

impl EngineConfig {
    pub fn channels(&self) -> Vec<PropellantChannel> {
        self.propellants
            .iter()
            .map(|p| PropellantChannel {
                id: p.id,
                name: p.name.clone(),
                ratio: p.ratio,
            })
            .collect()
    }

    pub fn densities(&self) -> BTreeMap<i32, f64> {
        self.resources.iter().map(|r| (r.id, r.density)).collect()
    }

    pub fn mixture_records(&self) -> Result<Vec<MixtureRecord>, ConfigError> {
        self.mixtures.iter().map(MixtureConfig::to_record).collect()
    }
}

/// Load engine definitions from a YAML list, a single TOML file, or a directory of TOML files.
pub fn load_engine_configs<P: AsRef<Path>>(path: P) -> Result<Vec<EngineConfig>, ConfigError> {
    let engines: Vec<EngineConfig> = load_records(path)?;
    debug!("loaded {} engine definition(s)", engines.len());
    Ok(engines)
}

/// Load a bare list of mixture calibration points from YAML or TOML.
pub fn load_mixture_configs<P: AsRef<Path>>(path: P) -> Result<Vec<MixtureConfig>, ConfigError> {
    #[derive(Deserialize)]
    struct MixtureFile {
        #[serde(alias = "MIXTURE")]
        mixture: Vec<MixtureConfig>,
    }

    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let file: MixtureFile = toml::from_str(&contents)?;
        Ok(file.mixture)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ENGINE_TOML: &str = r#"
name = "RL10"

[[propellants]]
id = 1
name = "LqdHydrogen"
ratio = 0.73

[[propellants]]
id = 2
name = "LqdOxygen"
ratio = 0.27

[[resources]]
id = 1
name = "LqdHydrogen"
density = 0.00007085

[[resources]]
id = 2
name = "LqdOxygen"
density = 0.001141

[[mixtures]]
ratio = 4.0
maxThrust = 73.4
atmosphereCurve = [[0.0, 455.0, 0.0, 0.0], [1.0, 230.0]]

[[mixtures]]
ratio = 6.0
minThrust = 10.0
maxThrust = 110.0
atmosphereCurve = [[0.0, 435.0, 0.0, 0.0], [1.0, 210.0]]
"#;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).expect("create file");
        file.write_all(contents.as_bytes()).expect("write file");
        path
    }

    #[test]
    fn toml_engine_defaults_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(dir.path(), "rl10.toml", ENGINE_TOML);
        let engines = load_engine_configs(&path).expect("engine toml");
        assert_eq!(engines.len(), 1);

        let records = engines[0].mixture_records().expect("records");
        assert_eq!(records[0].name, "");
        assert_eq!(records[0].min_thrust, 0.0);
        assert_eq!(records[1].min_thrust, 10.0);
        assert_eq!(records[0].curve.len(), 2);
        assert_eq!(engines[0].densities()[&2], 0.001141);
        assert_eq!(engines[0].channels()[0].name, "LqdHydrogen");
    }

    #[test]
    fn directory_loads_sorted_toml_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "b.toml", &ENGINE_TOML.replace("RL10", "B-engine"));
        write(dir.path(), "a.toml", &ENGINE_TOML.replace("RL10", "A-engine"));
        write(dir.path(), "notes.txt", "ignored");
        let engines = load_engine_configs(dir.path()).expect("engine dir");
        let names: Vec<_> = engines.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A-engine", "B-engine"]);
    }

    #[test]
    fn yaml_mixture_list_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            dir.path(),
            "mixtures.yaml",
            "- configName: Vac\n  ratio: 5.0\n  maxThrust: 60\n- configName: Vac\n  ratio: 6.0\n  maxThrust: 70\n",
        );
        let mixtures = load_mixture_configs(&path).expect("mixture yaml");
        assert_eq!(mixtures.len(), 2);
        assert_eq!(mixtures[1].config_name, "Vac");
        assert!(mixtures[0].atmosphere_curve.is_empty());
    }

    #[test]
    fn malformed_curve_key_is_rejected() {
        let config = MixtureConfig {
            config_name: "Bad".into(),
            ratio: 5.0,
            min_thrust: 0.0,
            max_thrust: 50.0,
            atmosphere_curve: vec![vec![0.0, 300.0, 1.0]],
        };
        assert!(matches!(
            config.to_record(),
            Err(ConfigError::InvalidKey { index: 0, len: 3, .. })
        ));
    }
}
