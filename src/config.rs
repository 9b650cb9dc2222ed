//! Layered configuration for `tb`.
//!
//! Priority, highest first: command line flags (and their env vars), the
//! TOML file at `<config_dir>/taskboard/config.toml`, compiled defaults.
//! A missing default file is not an error; a missing `--config` file is.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::storage::STORAGE_SLOT;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

/// Shape of the TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub store_path: Option<PathBuf>,
    pub default_project: Option<String>,
    pub default_project_type: Option<String>,
    pub log_level: Option<String>,
}

/// Values given on the command line; `None` defers to the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub store_path: Option<PathBuf>,
    pub project: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// File holding the serialized projects
    pub store_path: PathBuf,
    /// Project opened when none is chosen with `--project`
    pub default_project: Option<String>,
    /// Type used by `project new` without `--type`
    pub default_project_type: String,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            default_project: None,
            default_project_type: "programacao".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let file = load_config_file(explicit_path)?;
        Ok(Self::resolve(overrides, file))
    }

    fn resolve(overrides: Overrides, file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            store_path: overrides
                .store_path
                .or(file.store_path)
                .unwrap_or(defaults.store_path),
            default_project: overrides.project.or(file.default_project),
            default_project_type: file
                .default_project_type
                .unwrap_or(defaults.default_project_type),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskboard")
        .join(format!("{STORAGE_SLOT}.json"))
}

fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(path) = explicit_path {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("taskboard").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
