//! Error types for otelpack
//!
//! Domain-specific error types using thiserror. Every variant is fatal:
//! the pipeline stops at the first error and the CLI exits with status 1.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration and argument validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Manifest path does not exist
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Manifest path exists but is not a regular file
    #[error("Manifest is not a file: {path}")]
    ManifestNotFile { path: PathBuf },

    /// Another required input file is missing
    #[error("{kind} not found: {path}")]
    MissingInput { kind: &'static str, path: PathBuf },

    /// Malformed entry in the platform list
    #[error("Invalid platform '{entry}': {reason}")]
    InvalidPlatform { entry: String, reason: String },

    /// Platform list contains nothing we can compile
    #[error("No linux platforms in '{platforms}'. Only linux/<arch> targets can be built")]
    NoSupportedPlatforms { platforms: String },

    /// Builder version is not a semantic version
    #[error("Invalid OCB version '{version}': {error}")]
    InvalidVersion { version: String, error: String },

    /// Image name or tag is empty
    #[error("{field} cannot be empty")]
    EmptyValue { field: &'static str },

    /// A directory otelpack deletes and recreates overlaps something it must keep
    #[error("Refusing to use '{path}' as the {kind}: {reason}")]
    UnsafeDirectory {
        kind: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// Two inputs would land on the same name in the build context
    #[error("{first} and {second} would both be staged as '{name}'")]
    StagedNameClash {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Tool provisioning errors
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Required host tool is not installed
    #[error("'{tool}' not found in PATH. {suggestion}")]
    PrerequisiteMissing { tool: String, suggestion: String },

    /// `go install` exited unsuccessfully
    #[error("Failed to install OCB v{version} ({status}): {detail}")]
    InstallFailed {
        version: String,
        status: String,
        detail: String,
    },

    /// The install step did not leave an executable where expected
    #[error("OCB executable not found after install: {path}")]
    ExecutableNotFound { path: PathBuf },

    /// Could not determine where `go install` puts binaries
    #[error("Failed to query Go environment: {error}")]
    GoEnv { error: String },

    /// Buildx builder context could not be created or bootstrapped
    #[error("Buildx builder '{name}' setup failed: {step}")]
    BuilderContext { name: String, step: String },
}

/// Per-architecture compile errors
#[derive(Error, Debug)]
pub enum CompileError {
    /// OCB exited unsuccessfully
    #[error("OCB build failed for {platform} ({status})")]
    BuildFailed { platform: String, status: String },

    /// No executable matching the collector name pattern was produced
    #[error("No collector binary found for {platform} in {dir}")]
    BinaryNotFound { platform: String, dir: PathBuf },

    /// Renaming the produced binary failed
    #[error("Failed to rename '{from}' to '{to}': {error}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// Image assembly errors
#[derive(Error, Debug)]
pub enum ImageError {
    /// `docker buildx build` exited unsuccessfully
    #[error("Image build failed for '{reference}' ({status})")]
    BuildFailed { reference: String, status: String },
}

/// External process errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The process could not be started at all
    #[error("Failed to run '{program}': {error}")]
    Spawn { program: String, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to copy a file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to walk a directory tree
    #[error("Failed to read directory '{path}': {error}")]
    ReadDir { path: PathBuf, error: String },
}

/// Top-level otelpack error type
#[derive(Error, Debug)]
pub enum OtelpackError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Provisioning error
    #[error("Provisioning error: {0}")]
    Provision(#[from] ProvisionError),

    /// Compile error
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Image error
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Process error
    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}

/// Convenience alias used throughout the pipeline
pub type Result<T, E = OtelpackError> = std::result::Result<T, E>;
