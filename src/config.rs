use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::Level;

use crate::error::ConfigError;
use crate::pipeline::services::image::analysis::DetectionConfig;

/// Settings file looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = "canopy-watch.toml";
/// Environment variable naming an explicit settings file.
pub const CONFIG_PATH_VAR: &str = "CANOPY_WATCH_CONFIG";
/// Prefix of per-key overrides, e.g. `CANOPY_WATCH_DETECTION__MIN_GREEN_THRESHOLD`.
pub const ENV_PREFIX: &str = "CANOPY_WATCH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub log_level: String,
    pub detection: DetectionConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            detection: DetectionConfig::default(),
        }
    }
}

impl Configuration {
    /// Defaults, then the settings file, then `CANOPY_WATCH_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
        Self::build(file.as_deref(), environment())
    }

    fn build(file: Option<&Path>, environment: Environment) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE).required(false),
        };

        let configuration: Configuration = Config::builder()
            .add_source(file_source)
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        configuration.detection.validate()?;
        Ok(configuration)
    }

    /// Parsed `log_level`, falling back to INFO for unknown names.
    pub fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
