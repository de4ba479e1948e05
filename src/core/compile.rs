//! Per-architecture collector compilation
//!
//! Runs OCB once per Linux platform, finds the binary it produced and gives
//! it the canonical name the Dockerfile copies from.

use std::path::{Path, PathBuf};

use crate::config::defaults::{BINARY_PREFIX, CANONICAL_BINARY, STATIC_LDFLAGS};
use crate::core::build_env::BuildEnvironment;
use crate::core::config::BuildConfig;
use crate::core::platform::Platform;
use crate::error::{CompileError, Result};
use crate::infra::executable::ExecutableCheck;
use crate::infra::filesystem;
use crate::infra::process::{Invocation, ProcessRunner};
use crate::infra::toolchain::OcbToolchain;

/// A platform whose binary is ready for packaging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPlatform {
    /// Target platform
    pub platform: Platform,
    /// Architecture-named output directory
    pub output_dir: PathBuf,
    /// Canonically named collector binary inside `output_dir`
    pub binary: PathBuf,
}

/// OCB invocation building `manifest` for `platform` into `output_dir`
pub fn ocb_invocation(
    ocb: &Path,
    manifest: &Path,
    output_dir: &Path,
    platform: &Platform,
) -> Invocation {
    let env = BuildEnvironment::for_platform(platform);

    env.to_env_map().into_iter().fold(
        Invocation::new(ocb)
            .arg(format!("--config={}", manifest.display()))
            .arg(format!("--output-path={}", output_dir.display()))
            .arg(format!("--ldflags={STATIC_LDFLAGS}")),
        |invocation, (key, value)| invocation.env(key, value),
    )
}

/// Compile the collector for one platform
pub async fn compile_platform<R: ProcessRunner>(
    runner: &R,
    ocb: &OcbToolchain,
    config: &BuildConfig,
    platform: &Platform,
    check: ExecutableCheck,
) -> Result<CompiledPlatform> {
    let output_dir = config.output_dir(platform);
    filesystem::recreate_dir(&output_dir)?;

    let invocation = ocb_invocation(ocb.path(), &config.manifest, &output_dir, platform)
        .current_dir(&config.work_dir);
    tracing::info!("Compiling collector for {platform} with OCB v{}", ocb.version());

    let status = runner.status(&invocation).await?;
    if !status.success() {
        return Err(CompileError::BuildFailed {
            platform: platform.to_string(),
            status: status.to_string(),
        }
        .into());
    }

    let found = find_collector_binary(&output_dir, check).ok_or_else(|| {
        CompileError::BinaryNotFound {
            platform: platform.to_string(),
            dir: output_dir.clone(),
        }
    })?;
    let binary = normalize_binary_name(&found, &output_dir)?;

    tracing::debug!("Collector for {platform} at {}", binary.display());
    Ok(CompiledPlatform {
        platform: platform.clone(),
        output_dir,
        binary,
    })
}

/// Find the executable OCB produced in `dir`
///
/// Matches regular files named `otelcol*` that `check` accepts. The canonical
/// name wins if present; otherwise the first match in name order.
pub fn find_collector_binary(dir: &Path, check: ExecutableCheck) -> Option<PathBuf> {
    let canonical = dir.join(CANONICAL_BINARY);
    if check.is_executable(&canonical) {
        return Some(canonical);
    }

    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(BINARY_PREFIX))
        .map(walkdir::DirEntry::into_path)
        .find(|path| check.is_executable(path))
}

/// Rename `binary` to `<output_dir>/otelcol-contrib`
///
/// No-op when it already carries that name.
pub fn normalize_binary_name(binary: &Path, output_dir: &Path) -> Result<PathBuf, CompileError> {
    let canonical = output_dir.join(CANONICAL_BINARY);
    if binary == canonical {
        return Ok(canonical);
    }

    std::fs::rename(binary, &canonical).map_err(|e| CompileError::Rename {
        from: binary.to_path_buf(),
        to: canonical.clone(),
        error: e.to_string(),
    })?;
    tracing::debug!("Renamed {} to {CANONICAL_BINARY}", binary.display());
    Ok(canonical)
}
