//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use assert_fs::prelude::*;
use assert_fs::TempDir;

/// Minimal OCB manifest
pub const MANIFEST: &str = "\
dist:
  name: otelcol-custom
  output_path: ./dist
receivers:
  - gomod: go.opentelemetry.io/collector/receiver/otlpreceiver v0.116.0
exporters:
  - gomod: go.opentelemetry.io/collector/exporter/debugexporter v0.116.0
";

/// Dockerfile consuming `dist/<arch>/otelcol-contrib`
pub const DOCKERFILE: &str = "\
FROM alpine:3.20
ARG TARGETARCH
COPY dist/${TARGETARCH}/otelcol-contrib /otelcol-contrib
COPY config.yaml /etc/otelcol/config.yaml
ENTRYPOINT [\"/otelcol-contrib\", \"--config\", \"/etc/otelcol/config.yaml\"]
";

/// Collector runtime configuration
pub const COLLECTOR_CONFIG: &str = "\
receivers:
  otlp:
    protocols:
      grpc: {}
exporters:
  debug: {}
service:
  pipelines:
    traces:
      receivers: [otlp]
      exporters: [debug]
";

/// Test project context
///
/// A temporary project directory plus an isolated config directory and an
/// empty PATH so no real tool is ever reached.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
    /// Isolated global config directory
    pub config_dir: TempDir,
    /// Directory used as the whole PATH
    pub bin_dir: TempDir,
}

impl TestProject {
    /// Create an empty project
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            config_dir: TempDir::new().expect("Failed to create config directory"),
            bin_dir: TempDir::new().expect("Failed to create bin directory"),
        }
    }

    /// Create a project with a manifest, Dockerfile and collector config
    pub fn with_inputs() -> Self {
        let project = Self::new();
        project.create_file("manifest.yaml", MANIFEST);
        project.create_file("Dockerfile", DOCKERFILE);
        project.create_file("config.yaml", COLLECTOR_CONFIG);
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        self.dir
            .child(name)
            .write_str(content)
            .expect("Failed to write file");
    }

    /// Write the global config file
    pub fn write_global_config(&self, content: &str) {
        self.config_dir
            .child("config.toml")
            .write_str(content)
            .expect("Failed to write global config");
    }

    /// Check if a file or directory exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Whether the run left any build artifacts behind
    pub fn has_artifacts(&self) -> bool {
        ["bin", "dist", "build"]
            .iter()
            .any(|name| self.file_exists(name))
    }

    /// otelpack command for the project with an isolated environment
    pub fn command(&self) -> Command {
        otelpack_command(self.dir.path(), self.config_dir.path(), self.bin_dir.path())
    }

    /// Run otelpack in the project with `args`
    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute otelpack")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

fn otelpack_command(cwd: &Path, config_dir: &Path, path: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_otelpack"));
    cmd.current_dir(cwd)
        .env("OTELPACK_CONFIG_DIR", config_dir)
        .env("PATH", path)
        .env_remove("RUST_LOG");
    for key in [
        "OTELPACK_MANIFEST",
        "OTELPACK_IMAGE",
        "OTELPACK_TAG",
        "OTELPACK_PLATFORMS",
        "OTELPACK_REGISTRY",
        "OTELPACK_OCB_VERSION",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

/// stdout as text
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// stderr as text
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
