//! Global configuration management
//!
//! Reads optional user defaults from `config.toml` in the config directory.
//! Values here sit between environment/CLI flags and the built-in defaults.
//!
//! ```toml
//! [defaults]
//! registry = "ghcr.io/acme"
//! platforms = "linux/amd64,linux/arm64,linux/arm/v7"
//! ocb_version = "0.116.0"
//! ```

use crate::infra::dirs::OtelpackDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for otelpack
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default build options
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// User overrides for the built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Image repository name
    pub image: Option<String>,

    /// Image tag
    pub tag: Option<String>,

    /// Registry prefix
    pub registry: Option<String>,

    /// Comma-separated platform list
    pub platforms: Option<String>,

    /// OCB version
    pub ocb_version: Option<String>,

    /// Buildx builder instance name
    pub builder_name: Option<String>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// A missing file yields the default configuration; an unreadable or
    /// invalid one is an error.
    pub fn load(dirs: &OtelpackDirs) -> Result<Self, GlobalConfigError> {
        let config_path = dirs.global_config_path();
        Self::load_from_path(&config_path)
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        tracing::debug!("Loaded global config from {}", path.display());
        Ok(config)
    }
}
