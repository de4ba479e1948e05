//! Build command implementation
//!
//! Resolves the configuration and runs the provision, compile and image
//! stages against the real host.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::{print_detail, print_success, print_warning};
use crate::core::config::{BuildConfig, BuildOptions};
use crate::core::global_config::GlobalConfig;
use crate::core::image::ImageOutcome;
use crate::core::pipeline;
use crate::infra::dirs::OtelpackDirs;
use crate::infra::process::SystemRunner;

/// Execute the build with `work_dir` as the project root
pub async fn execute(work_dir: &Path, options: BuildOptions) -> Result<()> {
    let dirs = OtelpackDirs::new();
    let global = GlobalConfig::load(&dirs).with_context(|| {
        format!(
            "Failed to load global config from {}",
            dirs.global_config_path().display()
        )
    })?;

    let config = BuildConfig::resolve(options, &global, work_dir)?;
    tracing::debug!("Resolved build configuration: {config:?}");

    let summary = pipeline::run(&config, &SystemRunner).await?;

    match summary.outcome {
        ImageOutcome::Pushed => print_success(&format!("Pushed {}", summary.reference)),
        ImageOutcome::BuiltOnly => print_success(&format!("Built {}", summary.reference)),
    }
    for platform in &summary.skipped {
        print_detail(&format!("{platform}: not compiled, passed to buildx only"));
    }
    for warning in &summary.warnings {
        print_warning(warning);
    }

    Ok(())
}
