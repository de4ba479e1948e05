//! Target platform parsing
//!
//! Platforms come in as a comma-separated `os/arch[/variant]` list, the same
//! form `docker buildx --platform` takes. Only `linux` entries are compiled;
//! everything else is carried along for buildx but skipped by the compile loop.

use std::fmt;
use std::str::FromStr;

use crate::config::defaults::SUPPORTED_OS;
use crate::error::ConfigError;

/// A single `os/arch[/variant]` target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    /// Go `$GOOS` value, e.g. `linux`
    pub os: String,
    /// Go `$GOARCH` value, e.g. `amd64`
    pub arch: String,
    /// OCI platform variant, e.g. `v7`
    pub variant: Option<String>,
}

impl Platform {
    /// Build a platform without a variant
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
            variant: None,
        }
    }

    /// Whether the compile loop handles this platform
    pub fn is_supported(&self) -> bool {
        self.os == SUPPORTED_OS
    }

    /// Directory name under `dist/` for this platform's binary
    ///
    /// `amd64`, `arm64`, or arch and variant glued together (`armv7`) so that
    /// several variants of one arch don't share an output directory.
    pub fn dist_dir_name(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{}{variant}", self.arch),
            None => self.arch.clone(),
        }
    }

    /// `$GOARM` for 32-bit ARM variants (`v6` -> `6`)
    pub fn goarm(&self) -> Option<&str> {
        if self.arch != "arm" {
            return None;
        }
        self.variant.as_deref().map(|v| v.trim_start_matches('v'))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)?;
        if let Some(variant) = &self.variant {
            write!(f, "/{variant}")?;
        }
        Ok(())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidPlatform {
            entry: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid("empty component"));
        }

        match parts.as_slice() {
            [os, arch] => Ok(Self::new(os.trim(), arch.trim())),
            [os, arch, variant] => Ok(Self {
                variant: Some(variant.trim().to_string()),
                ..Self::new(os.trim(), arch.trim())
            }),
            [_] => Err(invalid("expected os/arch")),
            _ => Err(invalid("too many components, expected os/arch[/variant]")),
        }
    }
}

/// Ordered platform list as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformList {
    platforms: Vec<Platform>,
}

impl PlatformList {
    /// Parse a comma-separated list; blank items are ignored
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let platforms = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Platform>, _>>()?;

        Ok(Self { platforms })
    }

    /// Every entry, supported or not
    pub fn all(&self) -> &[Platform] {
        &self.platforms
    }

    /// Entries the compile loop builds
    pub fn supported(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter().filter(|p| p.is_supported())
    }

    /// Entries the compile loop skips
    pub fn skipped(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter().filter(|p| !p.is_supported())
    }

    /// Whether any entry would be compiled
    pub fn has_supported(&self) -> bool {
        self.supported().next().is_some()
    }

    /// The list in `--platform` form
    pub fn to_buildx_arg(&self) -> String {
        self.platforms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
