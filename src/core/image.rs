//! Image assembly
//!
//! Stages the build context and runs a single multi-platform buildx build
//! over it.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::config::defaults::{DEFAULT_DOCKERFILE, STAGED_DIST_DIR};
use crate::core::compile::CompiledPlatform;
use crate::core::config::BuildConfig;
use crate::error::{ImageError, Result};
use crate::infra::buildx::{BuildxBuildConfig, BuildxBuilder};
use crate::infra::filesystem;
use crate::infra::process::ProcessRunner;

/// Result of the image step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    /// The image was pushed to the registry
    Pushed,
    /// The image was built but exists only in the build cache
    BuiltOnly,
}

/// Layout of a staged build context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedContext {
    /// Context root
    pub root: PathBuf,
    /// Dockerfile inside the context
    pub dockerfile: PathBuf,
}

/// Populate the staging directory from scratch
///
/// The context holds the manifest, the Dockerfile, the collector config and
/// `dist/<arch>` for every compiled platform.
pub fn stage(config: &BuildConfig, compiled: &[CompiledPlatform]) -> Result<StagedContext> {
    let root = config.staging_dir.clone();
    filesystem::recreate_dir(&root)?;

    for input in [&config.manifest, &config.dockerfile, &config.collector_config] {
        filesystem::copy_file(input, &root.join(file_name(input)))?;
    }

    for platform in compiled {
        let target = root
            .join(STAGED_DIST_DIR)
            .join(platform.platform.dist_dir_name());
        filesystem::copy_dir_all(&platform.output_dir, &target)?;
    }

    tracing::debug!(
        "Staged {} platform(s) in {}",
        compiled.len(),
        root.display()
    );
    Ok(StagedContext {
        dockerfile: root.join(file_name(&config.dockerfile)),
        root,
    })
}

/// Build options for the staged context
pub fn build_config(config: &BuildConfig, context: &StagedContext) -> BuildxBuildConfig {
    let build = BuildxBuildConfig::new(context.root.clone())
        .with_platforms(config.platforms.to_buildx_arg())
        .with_tag(config.image_reference())
        .no_cache(config.no_cache)
        .push(config.push);

    // buildx only finds `Dockerfile` on its own
    if context.dockerfile.file_name() == Some(OsStr::new(DEFAULT_DOCKERFILE)) {
        build
    } else {
        build.with_file(context.dockerfile.clone())
    }
}

/// Stage the context and build the multi-platform image
pub async fn assemble_image<R: ProcessRunner>(
    runner: &R,
    builder: &BuildxBuilder,
    config: &BuildConfig,
    compiled: &[CompiledPlatform],
) -> Result<ImageOutcome> {
    let context = stage(config, compiled)?;
    let reference = config.image_reference();

    let invocation = builder
        .build_invocation(&build_config(config, &context))
        .current_dir(&config.work_dir);
    tracing::info!(
        "Building {reference} for {}",
        config.platforms.to_buildx_arg()
    );

    let status = runner.status(&invocation).await?;
    if !status.success() {
        return Err(ImageError::BuildFailed {
            reference,
            status: status.to_string(),
        }
        .into());
    }

    if config.push {
        Ok(ImageOutcome::Pushed)
    } else {
        Ok(ImageOutcome::BuiltOnly)
    }
}

fn file_name(path: &Path) -> &Path {
    path.file_name().map_or(path, Path::new)
}
