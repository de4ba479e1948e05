//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no build logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::core::config::BuildOptions;

/// otelpack - Multi-architecture OpenTelemetry Collector image builder
///
/// Compiles a custom collector with OCB for each Linux platform and packages
/// the binaries into one multi-platform image with Docker buildx.
#[derive(Parser, Debug)]
#[command(name = "otelpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// OCB manifest describing the collector distribution
    #[arg(short, long, env = "OTELPACK_MANIFEST", value_name = "FILE")]
    pub manifest: PathBuf,

    /// Image repository name
    #[arg(short, long, env = "OTELPACK_IMAGE", value_name = "NAME")]
    pub image: Option<String>,

    /// Image tag
    #[arg(short, long, env = "OTELPACK_TAG")]
    pub tag: Option<String>,

    /// Comma-separated target platforms [default: linux/amd64,linux/arm64]
    ///
    /// Only linux/<arch> entries are compiled; every entry is passed to buildx.
    #[arg(short, long, env = "OTELPACK_PLATFORMS", value_name = "LIST")]
    pub platforms: Option<String>,

    /// Registry prefix for the image reference (e.g. ghcr.io/acme)
    #[arg(short, long, env = "OTELPACK_REGISTRY")]
    pub registry: Option<String>,

    /// Push the image to the registry
    #[arg(long)]
    pub push: bool,

    /// Build without the buildx cache
    #[arg(long)]
    pub no_cache: bool,

    /// OCB version to provision
    #[arg(long, env = "OTELPACK_OCB_VERSION", value_name = "VERSION")]
    pub ocb_version: Option<String>,

    /// Dockerfile used to package the binaries
    #[arg(long, value_name = "FILE")]
    pub dockerfile: Option<PathBuf>,

    /// Collector runtime configuration copied into the image
    #[arg(long, value_name = "FILE")]
    pub collector_config: Option<PathBuf>,

    /// Output root for per-architecture binaries
    #[arg(long, value_name = "DIR")]
    pub dist_dir: Option<PathBuf>,

    /// Build context directory handed to buildx
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse the command line, exiting on usage errors
    ///
    /// Help and version exit 0; any other parse failure prints the usage
    /// error and exits 1.
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(e) => {
                let code = if e.use_stderr() { 1 } else { 0 };
                // Printing can only fail if the terminal is gone
                let _ = e.print();
                std::process::exit(code);
            }
        }
    }

    /// Raw options for configuration resolution
    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            manifest: self.manifest.clone(),
            image: self.image.clone(),
            tag: self.tag.clone(),
            platforms: self.platforms.clone(),
            registry: self.registry.clone(),
            push: self.push,
            no_cache: self.no_cache,
            ocb_version: self.ocb_version.clone(),
            dockerfile: self.dockerfile.clone(),
            collector_config: self.collector_config.clone(),
            dist_dir: self.dist_dir.clone(),
            staging_dir: self.staging_dir.clone(),
        }
    }

    /// Execute the build in the current directory
    pub async fn run(self) -> Result<()> {
        let work_dir =
            std::env::current_dir().context("Failed to determine the working directory")?;
        commands::build::execute(&work_dir, self.options()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_minimal_arguments() {
        let cli = Cli::try_parse_from(["otelpack", "-m", "manifest.yaml"]).unwrap();
        let options = cli.options();

        assert_eq!(options.manifest, PathBuf::from("manifest.yaml"));
        assert!(!options.push);
        assert!(!options.no_cache);
        assert!(options.registry.is_none());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "otelpack",
            "--manifest",
            "m.yaml",
            "-i",
            "mycol",
            "-t",
            "v1",
            "-p",
            "linux/amd64",
            "-r",
            "ghcr.io/acme",
            "--push",
            "--no-cache",
            "--ocb-version",
            "0.115.0",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.image.as_deref(), Some("mycol"));
        assert_eq!(cli.tag.as_deref(), Some("v1"));
        assert_eq!(cli.platforms.as_deref(), Some("linux/amd64"));
        assert_eq!(cli.registry.as_deref(), Some("ghcr.io/acme"));
        assert_eq!(cli.ocb_version.as_deref(), Some("0.115.0"));
        assert!(cli.push);
        assert!(cli.no_cache);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = Cli::try_parse_from(["otelpack", "-m", "m.yaml", "--bogus"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_help_is_not_an_error_exit() {
        let err = Cli::try_parse_from(["otelpack", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
