//! OCB toolchain management
//!
//! Makes sure the pinned version of the OpenTelemetry Collector Builder sits
//! at a known local path. An existing copy reporting the right version is
//! reused as is; otherwise it is installed with `go install` and copied in.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::cli::output::create_spinner;
use crate::config::defaults::OCB_INSTALLED_NAME;
use crate::config::urls::{GO_DOWNLOAD, OCB_MODULE};
use crate::error::{ProvisionError, Result};
use crate::infra::executable::make_executable;
use crate::infra::filesystem;
use crate::infra::process::{Invocation, ProcessRunner};

/// What provisioning had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The local copy already had the right version
    Reused,
    /// The pinned version was installed
    Installed,
}

/// A provisioned OCB executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcbToolchain {
    path: PathBuf,
    version: semver::Version,
}

impl OcbToolchain {
    /// Wrap an OCB executable at `path`
    pub fn new(path: PathBuf, version: semver::Version) -> Self {
        Self { path, version }
    }

    /// Get the path to the OCB binary
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version this toolchain was provisioned at
    pub fn version(&self) -> &semver::Version {
        &self.version
    }

    /// Ensure OCB `version` is available at `path`
    pub async fn ensure<R: ProcessRunner>(
        runner: &R,
        path: &Path,
        version: &semver::Version,
    ) -> Result<(Self, ProvisionOutcome)> {
        let toolchain = Self::new(path.to_path_buf(), version.clone());

        match installed_version(runner, path).await {
            Some(found) if &found == version => {
                tracing::info!("OCB v{version} already present at {}", path.display());
                return Ok((toolchain, ProvisionOutcome::Reused));
            }
            Some(found) => {
                tracing::info!("Replacing OCB v{found} with v{version}");
            }
            None => {
                tracing::info!("No usable OCB at {}", path.display());
            }
        }

        install(runner, path, version).await?;
        Ok((toolchain, ProvisionOutcome::Installed))
    }
}

/// Version reported by an existing OCB binary, if there is one that runs
async fn installed_version<R: ProcessRunner>(runner: &R, path: &Path) -> Option<semver::Version> {
    if !path.is_file() {
        return None;
    }

    let output = runner
        .output(&Invocation::new(path).arg("version"))
        .await
        .ok()?;
    if !output.status.success() {
        tracing::debug!("'{} version' failed: {}", path.display(), output.status);
        return None;
    }

    extract_version(&output.combined()).and_then(|v| semver::Version::parse(&v).ok())
}

/// Extract a version string from tool output (`ocb version v0.116.0`)
pub fn extract_version(output: &str) -> Option<String> {
    static VERSION_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    VERSION_REGEX
        .get_or_init(|| Regex::new(r"v?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?)").ok())
        .as_ref()?
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

async fn install<R: ProcessRunner>(
    runner: &R,
    path: &Path,
    version: &semver::Version,
) -> Result<()> {
    let go = runner
        .locate("go")
        .ok_or_else(|| ProvisionError::PrerequisiteMissing {
            tool: "go".to_string(),
            suggestion: format!("Install Go from {GO_DOWNLOAD} to provision OCB"),
        })?;

    let spinner = create_spinner(&format!("Installing OCB v{version}..."));
    let go_install = Invocation::new(&go)
        .arg("install")
        .arg(format!("{OCB_MODULE}@v{version}"));
    let output = runner.output(&go_install).await;
    spinner.finish_and_clear();

    let output = output?;
    if !output.status.success() {
        return Err(ProvisionError::InstallFailed {
            version: version.to_string(),
            status: output.status.to_string(),
            detail: output.stderr.trim().to_string(),
        }
        .into());
    }

    let installed = go_bin_dir(runner, &go)
        .await?
        .join(format!("{OCB_INSTALLED_NAME}{}", std::env::consts::EXE_SUFFIX));
    if !installed.is_file() {
        return Err(ProvisionError::ExecutableNotFound { path: installed }.into());
    }

    filesystem::copy_file(&installed, path)?;
    make_executable(path).map_err(|_| ProvisionError::ExecutableNotFound {
        path: path.to_path_buf(),
    })?;

    tracing::info!("Installed OCB v{version} to {}", path.display());
    Ok(())
}

/// Directory `go install` writes binaries to: `$GOBIN`, else `$GOPATH/bin`
async fn go_bin_dir<R: ProcessRunner>(runner: &R, go: &Path) -> Result<PathBuf> {
    let gobin = go_env(runner, go, "GOBIN").await?;
    if !gobin.is_empty() {
        return Ok(PathBuf::from(gobin));
    }

    let gopath = go_env(runner, go, "GOPATH").await?;
    // GOPATH may be a list; go install uses the first entry
    std::env::split_paths(&gopath)
        .next()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.join("bin"))
        .ok_or_else(|| {
            ProvisionError::GoEnv {
                error: "GOPATH is empty".to_string(),
            }
            .into()
        })
}

async fn go_env<R: ProcessRunner>(runner: &R, go: &Path, key: &str) -> Result<String> {
    let output = runner
        .output(&Invocation::new(go).args(["env", key]))
        .await?;
    if !output.status.success() {
        return Err(ProvisionError::GoEnv {
            error: format!("'go env {key}' failed ({}): {}", output.status, output.stderr.trim()),
        }
        .into());
    }
    Ok(output.stdout.trim().to_string())
}
