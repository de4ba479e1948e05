//! Platform-specific directory management
//!
//! Locates the directory holding the optional global `config.toml`.
//! Follows XDG on Linux and standard locations on macOS.
//!
//! `OTELPACK_CONFIG_DIR` overrides the platform default.

use std::env;
use std::path::PathBuf;

/// Environment variable name for the config directory override
pub const ENV_CONFIG_DIR: &str = "OTELPACK_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "otelpack";

/// Global config file name
const CONFIG_FILE: &str = "config.toml";

/// Platform-specific directory provider for otelpack
#[derive(Debug, Clone)]
pub struct OtelpackDirs {
    config_dir: PathBuf,
}

impl OtelpackDirs {
    /// Create a new `OtelpackDirs` instance
    ///
    /// Checks the environment first, then falls back to the platform default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Use an explicit config directory
    #[must_use]
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the global config file path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/otelpack/config.toml` or `~/.config/otelpack/config.toml`
    /// - macOS: `~/Library/Application Support/otelpack/config.toml`
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        Self::platform_config_dir()
    }

    fn platform_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for OtelpackDirs {
    fn default() -> Self {
        Self::new()
    }
}
