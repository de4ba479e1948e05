//! Multiarch image builds with Docker buildx
//!
//! Registers and bootstraps a named `docker-container` builder instance, and
//! turns a [`BuildxBuildConfig`] into `docker buildx build` arguments.

use std::path::PathBuf;

use crate::cli::output::create_spinner;
use crate::config::urls::BUILDX_DOCS;
use crate::error::{ProvisionError, Result};
use crate::infra::process::{Invocation, ProcessOutput, ProcessRunner};

/// Driver used for builders we create; the default `docker` driver cannot
/// produce multi-platform images
const BUILDER_DRIVER: &str = "docker-container";

/// A registered, bootstrapped buildx builder instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildxBuilder {
    /// Path to the docker CLI
    docker: PathBuf,
    /// Builder instance name
    name: String,
}

impl BuildxBuilder {
    /// Wrap an existing builder instance
    pub fn new(docker: PathBuf, name: impl Into<String>) -> Self {
        Self {
            docker,
            name: name.into(),
        }
    }

    /// Get the builder instance name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Make sure builder `name` exists, is selected and is running
    ///
    /// Fails if docker or the buildx plugin is missing.
    pub async fn ensure<R: ProcessRunner>(runner: &R, name: &str) -> Result<Self> {
        let docker = runner
            .locate("docker")
            .ok_or_else(|| ProvisionError::PrerequisiteMissing {
                tool: "docker".to_string(),
                suggestion: format!("Install Docker with the buildx plugin: {BUILDX_DOCS}"),
            })?;
        let builder = Self::new(docker, name);

        let version = runner.output(&builder.buildx(["version"])).await?;
        if !version.status.success() {
            return Err(ProvisionError::PrerequisiteMissing {
                tool: "docker buildx".to_string(),
                suggestion: format!("Install the buildx plugin: {BUILDX_DOCS}"),
            }
            .into());
        }

        let inspect = runner.output(&builder.buildx(["inspect", name])).await?;
        if inspect.status.success() {
            tracing::info!("Using existing buildx builder '{name}'");
            builder.checked(runner, ["use", name]).await?;
        } else {
            tracing::info!("Creating buildx builder '{name}'");
            builder
                .checked(
                    runner,
                    ["create", "--name", name, "--driver", BUILDER_DRIVER, "--use"],
                )
                .await?;
        }

        let spinner = create_spinner(&format!("Bootstrapping buildx builder '{name}'..."));
        let bootstrapped = builder
            .checked(runner, ["inspect", "--bootstrap", name])
            .await;
        spinner.finish_and_clear();
        bootstrapped?;

        Ok(builder)
    }

    /// `docker buildx <args>`
    pub fn buildx<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(&self.docker).arg("buildx").args(args)
    }

    /// `docker buildx build` invocation for `config` on this builder
    pub fn build_invocation(&self, config: &BuildxBuildConfig) -> Invocation {
        self.buildx(config.build_args(&self.name))
    }

    async fn checked<R, const N: usize>(&self, runner: &R, args: [&str; N]) -> Result<ProcessOutput>
    where
        R: ProcessRunner,
    {
        let invocation = self.buildx(args);
        let output = runner.output(&invocation).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(ProvisionError::BuilderContext {
                name: self.name.clone(),
                step: format!(
                    "'docker buildx {}' failed ({}): {}",
                    args.join(" "),
                    output.status,
                    output.stderr.trim()
                ),
            }
            .into())
        }
    }
}

/// Options for one `docker buildx build` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildxBuildConfig {
    /// `--platform` value
    pub platforms: String,
    /// Image references (`-t`)
    pub tags: Vec<String>,
    /// Build context directory
    pub context: PathBuf,
    /// Dockerfile, relative to the context when unset
    pub file: Option<PathBuf>,
    /// Pass `--no-cache`
    pub no_cache: bool,
    /// Pass `--push`
    pub push: bool,
}

impl BuildxBuildConfig {
    /// Build config for `context`
    pub fn new(context: PathBuf) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    /// Set the target platforms
    #[must_use]
    pub fn with_platforms(mut self, platforms: impl Into<String>) -> Self {
        self.platforms = platforms.into();
        self
    }

    /// Add an image reference
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Use a Dockerfile outside the default location
    #[must_use]
    pub fn with_file(mut self, file: PathBuf) -> Self {
        self.file = Some(file);
        self
    }

    /// Disable the build cache
    #[must_use]
    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    /// Push the result to the registry
    #[must_use]
    pub fn push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    /// Arguments following `docker buildx`
    pub fn build_args(&self, builder: &str) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            "--builder".to_string(),
            builder.to_string(),
        ];

        if !self.platforms.is_empty() {
            args.push("--platform".to_string());
            args.push(self.platforms.clone());
        }

        for tag in &self.tags {
            args.push("-t".to_string());
            args.push(tag.clone());
        }

        if let Some(file) = &self.file {
            args.push("-f".to_string());
            args.push(file.display().to_string());
        }

        if self.no_cache {
            args.push("--no-cache".to_string());
        }

        if self.push {
            args.push("--push".to_string());
        }

        args.push(self.context.display().to_string());
        args
    }
}
