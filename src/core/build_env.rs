//! Build environment setup
//!
//! Cross-compilation parameters for one OCB run: `GOOS`, `GOARCH`,
//! `CGO_ENABLED` and, for 32-bit ARM, `GOARM`. The result is attached to a
//! single [`Invocation`](crate::infra::process::Invocation); the otelpack
//! process environment is never modified.

use std::collections::BTreeMap;

use crate::core::platform::Platform;

/// Go toolchain environment for one target platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnvironment {
    /// Target OS (`GOOS`)
    pub goos: String,
    /// Target architecture (`GOARCH`)
    pub goarch: String,
    /// ARM revision (`GOARM`), only for `arm`
    pub goarm: Option<String>,
    /// Whether cgo (and with it native library linkage) is allowed
    pub cgo_enabled: bool,
}

impl BuildEnvironment {
    /// Static, cgo-free environment for `platform`
    pub fn for_platform(platform: &Platform) -> Self {
        Self {
            goos: platform.os.clone(),
            goarch: platform.arch.clone(),
            goarm: platform.goarm().map(ToString::to_string),
            cgo_enabled: false,
        }
    }

    /// Convert to an ordered variable map for process execution
    pub fn to_env_map(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();

        env.insert("GOOS".to_string(), self.goos.clone());
        env.insert("GOARCH".to_string(), self.goarch.clone());
        env.insert(
            "CGO_ENABLED".to_string(),
            if self.cgo_enabled { "1" } else { "0" }.to_string(),
        );
        if let Some(goarm) = &self.goarm {
            env.insert("GOARM".to_string(), goarm.clone());
        }

        env
    }
}
