use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::uac::v2;

/// How the synthesized Audio 2.0 function presents itself.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct FunctionConfig {
    /// bCategory of every Audio Control header.
    pub category: u8,
    /// Whether an Interface Association Descriptor precedes each audio function.
    pub interface_association: bool,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            category: v2::FUNCTION_CATEGORY_IO_BOX,
            interface_association: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or_else(|_| {
            eprintln!("uacd: unknown log level {:?}, using info", self.level);
            log::LevelFilter::Info
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    pub function: FunctionConfig,
    pub log: LogConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: std::io::Error },

    #[error("failed to parse {path}: {error}")]
    Toml { path: String, error: toml::de::Error },
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let bytes = fs::read(path).map_err(|error| ConfigError::Io {
            path: display.clone(),
            error,
        })?;
        toml::from_slice(&bytes).map_err(|error| ConfigError::Toml {
            path: display,
            error,
        })
    }
}

lazy_static! {
    pub static ref DEFAULT_CONFIG: Config = {
        const TOML: &'static [u8] = include_bytes!("../config.toml");

        toml::from_slice::<Config>(TOML).expect("Failed to parse internally embedded config file")
    };
}
