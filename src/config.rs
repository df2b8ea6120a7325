use std::fmt;
use std::path::Path;
use std::str::FromStr;

use burn::config::Config;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// What the input window is built from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReturnMode {
    /// Atmospheric grid fused across levels, predicting the track.
    Weather,
    /// Track only, autoregressive.
    Hurricane,
}

impl ReturnMode {
    pub fn needs_grid(&self) -> bool {
        matches!(self, ReturnMode::Weather)
    }
}

impl FromStr for ReturnMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weather" => Ok(ReturnMode::Weather),
            "hurricane" => Ok(ReturnMode::Hurricane),
            other => Err(ConfigError::UnsupportedReturnMode(other.to_string())),
        }
    }
}

impl fmt::Display for ReturnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnMode::Weather => write!(f, "weather"),
            ReturnMode::Hurricane => write!(f, "hurricane"),
        }
    }
}

/// What happens to a pass when a record cannot be loaded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Yield the error and end the pass.
    #[default]
    Abort,
    /// Count the failure and continue with the next record.
    Skip,
}

#[derive(Config, Debug)]
pub struct WindowingConfig {
    /// Parallel rows each record is reshaped into.
    pub batch_size: usize,
    /// Time steps per window.
    pub window_len: usize,
    pub return_mode: ReturnMode,
    /// Track channels predicted by the target window.
    pub hur_output_dim: Vec<usize>,
    /// Steps the target sequence is moved forward before windowing.
    #[config(default = 0)]
    pub phase_shift: usize,
    /// Drop leading steps (true) or trailing steps (false) when aligning.
    #[config(default = false)]
    pub cut_start: bool,
    #[config(default = false)]
    pub vector_mode: bool,
    #[config(default = 1)]
    pub vector_freq: usize,
    #[config(default = "LoadPolicy::Abort")]
    pub load_policy: LoadPolicy,
    /// Track channels fed as input in hurricane mode.
    pub hur_input_dim: Option<Vec<usize>>,
    /// Grid channels fed as input in weather mode.
    pub weather_input_dim: Option<Vec<usize>>,
    /// Grid levels fed as input in weather mode.
    pub atm_levels: Option<Vec<usize>>,
}

const REQUIRED_KEYS: [&str; 4] = ["batch_size", "window_len", "return_mode", "hur_output_dim"];

/// Shorter names accepted in parameter mappings.
const ALIASES: [(&str, &str); 3] = [
    ("hur_input_dim", "input_dim"),
    ("hur_output_dim", "output_dim"),
    ("vector_freq", "vec_freq"),
];

fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        ALIASES
            .iter()
            .find(|(name, _)| *name == key)
            .and_then(|(_, alias)| map.get(*alias))
    })
}

fn parse<T: DeserializeOwned>(key: &'static str, value: &Value) -> Result<T, ConfigError> {
    T::deserialize(value).map_err(|err| ConfigError::InvalidValue {
        key,
        reason: err.to_string(),
    })
}

impl WindowingConfig {
    /// Builds a config from a flat key/value mapping and validates it.
    /// `input_dim`, `output_dim` and `vec_freq` are read as
    /// `hur_input_dim`, `hur_output_dim` and `vector_freq`.
    pub fn from_params(params: &Value) -> Result<Self, ConfigError> {
        let map = params
            .as_object()
            .ok_or_else(|| ConfigError::Malformed("expected a flat object".to_string()))?;

        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| lookup(map, key).is_none()) {
            return Err(ConfigError::MissingKey(*missing));
        }

        let return_mode = match map.get("return_mode") {
            Some(Value::String(mode)) => ReturnMode::from_str(mode)?,
            Some(other) => return Err(ConfigError::UnsupportedReturnMode(other.to_string())),
            None => return Err(ConfigError::MissingKey("return_mode")),
        };

        let required = |key: &'static str| lookup(map, key).ok_or(ConfigError::MissingKey(key));

        let mut config = WindowingConfig::new(
            parse("batch_size", required("batch_size")?)?,
            parse("window_len", required("window_len")?)?,
            return_mode,
            parse("hur_output_dim", required("hur_output_dim")?)?,
        );

        if let Some(value) = lookup(map, "phase_shift") {
            config.phase_shift = parse("phase_shift", value)?;
        }
        if let Some(value) = lookup(map, "cut_start") {
            config.cut_start = parse("cut_start", value)?;
        }
        if let Some(value) = lookup(map, "vector_mode") {
            config.vector_mode = parse("vector_mode", value)?;
        }
        if let Some(value) = lookup(map, "vector_freq") {
            config.vector_freq = parse("vector_freq", value)?;
        }
        if let Some(value) = lookup(map, "load_policy") {
            config.load_policy = parse("load_policy", value)?;
        }
        if let Some(value) = lookup(map, "hur_input_dim") {
            config.hur_input_dim = parse("hur_input_dim", value)?;
        }
        if let Some(value) = lookup(map, "weather_input_dim") {
            config.weather_input_dim = parse("weather_input_dim", value)?;
        }
        if let Some(value) = lookup(map, "atm_levels") {
            config.atm_levels = parse("atm_levels", value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|err| ConfigError::Malformed(format!("{}: {err}", path.as_ref().display())))?;
        let params: Value =
            serde_json::from_str(&raw).map_err(|err| ConfigError::Malformed(err.to_string()))?;

        Self::from_params(&params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |key: &'static str, value: usize| {
            if value == 0 {
                Err(ConfigError::InvalidValue {
                    key,
                    reason: "must be greater than zero".to_string(),
                })
            } else {
                Ok(())
            }
        };

        positive("batch_size", self.batch_size)?;
        positive("window_len", self.window_len)?;
        positive("vector_freq", self.vector_freq)?;

        if self.batch_size.checked_mul(self.window_len).is_none() {
            return Err(ConfigError::InvalidValue {
                key: "window_len",
                reason: format!(
                    "batch_size * window_len overflows for batch_size {}",
                    self.batch_size
                ),
            });
        }

        if self.hur_output_dim.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "hur_output_dim",
                reason: "must select at least one channel".to_string(),
            });
        }

        let required = |key: &'static str, value: &Option<Vec<usize>>| match value {
            None => Err(ConfigError::MissingKey(key)),
            Some(dims) if dims.is_empty() => Err(ConfigError::InvalidValue {
                key,
                reason: "must select at least one index".to_string(),
            }),
            Some(_) => Ok(()),
        };

        match self.return_mode {
            ReturnMode::Weather => {
                required("weather_input_dim", &self.weather_input_dim)?;
                required("atm_levels", &self.atm_levels)?;
            }
            ReturnMode::Hurricane => required("hur_input_dim", &self.hur_input_dim)?,
        }

        Ok(())
    }

    /// Shortest sequence that yields one full batch of windows.
    pub fn min_len(&self) -> usize {
        self.batch_size.saturating_mul(self.window_len)
    }
}
