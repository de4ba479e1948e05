//! Build pipeline
//!
//! Provision, compile every Linux platform in order, then assemble the image.
//! Each stage runs to completion before the next starts and the first error
//! ends the run.

use crate::cli::output::{print_detail, print_info};
use crate::core::compile::{compile_platform, CompiledPlatform};
use crate::core::config::BuildConfig;
use crate::core::image::{assemble_image, ImageOutcome};
use crate::core::platform::Platform;
use crate::error::Result;
use crate::infra::buildx::BuildxBuilder;
use crate::infra::executable::ExecutableCheck;
use crate::infra::process::ProcessRunner;
use crate::infra::toolchain::{OcbToolchain, ProvisionOutcome};

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Image reference that was built
    pub reference: String,
    /// Platforms compiled, in list order
    pub compiled: Vec<CompiledPlatform>,
    /// Non-Linux entries left to buildx alone
    pub skipped: Vec<Platform>,
    /// Provisioning result for OCB
    pub provision: ProvisionOutcome,
    /// Image step result
    pub outcome: ImageOutcome,
    /// Things the user should know about a run that still succeeded
    pub warnings: Vec<String>,
}

/// Run the whole build for `config`
pub async fn run<R: ProcessRunner>(config: &BuildConfig, runner: &R) -> Result<BuildSummary> {
    let check = ExecutableCheck::detect();

    print_info(&format!("Provisioning OCB v{}", config.ocb_version));
    let (ocb, provision) =
        OcbToolchain::ensure(runner, &config.ocb_path(), &config.ocb_version).await?;
    let builder = BuildxBuilder::ensure(runner, &config.builder_name).await?;

    let mut compiled = Vec::new();
    for platform in config.platforms.supported() {
        print_info(&format!("Compiling {platform}"));
        let result = compile_platform(runner, &ocb, config, platform, check).await?;
        print_detail(&result.binary.display().to_string());
        compiled.push(result);
    }

    let skipped: Vec<Platform> = config.platforms.skipped().cloned().collect();
    for platform in &skipped {
        tracing::debug!("Skipping compile for {platform}: not a linux target");
    }

    let reference = config.image_reference();
    print_info(&format!("Building image {reference}"));
    let outcome = assemble_image(runner, &builder, config, &compiled).await?;

    let mut warnings = Vec::new();
    if outcome == ImageOutcome::BuiltOnly {
        warnings.push(
            "Image was built but not pushed. Multi-platform images cannot be loaded into the \
             local image store; use --push or build a single platform to run it locally."
                .to_string(),
        );
    }

    Ok(BuildSummary {
        reference,
        compiled,
        skipped,
        provision,
        outcome,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BuildOptions;
    use crate::core::global_config::GlobalConfig;
    use crate::error::{CompileError, OtelpackError};
    use crate::infra::process::{Invocation, ProcessOutput};
    use crate::test_utils::{fake_ocb_build, RecordingRunner};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn project(dir: &Path, options: BuildOptions) -> BuildConfig {
        std::fs::write(dir.join("manifest.yaml"), "dist: {}\n").unwrap();
        std::fs::write(dir.join("Dockerfile"), "FROM scratch\n").unwrap();
        std::fs::write(dir.join("config.yaml"), "receivers: {}\n").unwrap();
        BuildConfig::resolve(
            BuildOptions {
                manifest: PathBuf::from("manifest.yaml"),
                ..options
            },
            &GlobalConfig::default(),
            dir,
        )
        .unwrap()
    }

    /// Host with go, docker, a present builder and a working OCB
    fn host<F>(gopath: PathBuf, on_build: F) -> RecordingRunner
    where
        F: Fn(&Invocation) -> ProcessOutput + Send + Sync + 'static,
    {
        RecordingRunner::new()
            .with_program("go", "/usr/local/go/bin/go")
            .with_program("docker", "/usr/bin/docker")
            .with_handler(move |inv| match inv.program_name().as_str() {
                "go" => match inv.args.first().map(String::as_str) {
                    Some("env") if inv.has_arg("GOPATH") => {
                        ProcessOutput::ok(gopath.display().to_string())
                    }
                    Some("install") => {
                        crate::test_utils::write_executable(&gopath.join("bin/builder"));
                        ProcessOutput::ok("")
                    }
                    _ => ProcessOutput::ok(""),
                },
                "ocb" if inv.has_arg("version") => ProcessOutput::ok("ocb version v0.116.0"),
                "ocb" => fake_ocb_build(inv, "otelcol-custom"),
                _ => on_build(inv),
            })
    }

    #[tokio::test]
    async fn test_default_run_builds_both_arches_then_image() {
        let temp = TempDir::new().unwrap();
        let config = project(temp.path(), BuildOptions::default());
        let dist = temp.path().join("dist");
        let seen_before_build = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&seen_before_build);
        let runner = host(temp.path().join("gopath"), move |inv| {
            if inv.args.get(1).map(String::as_str) == Some("build") {
                for arch in ["amd64", "arm64"] {
                    let present = dist.join(arch).join("otelcol-contrib").is_file();
                    seen.lock().unwrap().push((arch, present));
                }
            }
            ProcessOutput::ok("")
        });

        let summary = run(&config, &runner).await.unwrap();

        assert_eq!(
            *seen_before_build.lock().unwrap(),
            vec![("amd64", true), ("arm64", true)]
        );
        assert_eq!(summary.compiled.len(), 2);
        assert_eq!(summary.outcome, ImageOutcome::BuiltOnly);
        assert_eq!(summary.provision, ProvisionOutcome::Installed);
        assert_eq!(summary.warnings.len(), 1);
        assert!(summary.warnings[0].contains("not pushed"));
        assert_eq!(runner.count("docker", &["buildx", "build"]), 1);
        assert!(temp.path().join("bin/ocb").is_file());
    }

    #[tokio::test]
    async fn test_push_flag_reaches_buildx() {
        let temp = TempDir::new().unwrap();
        let config = project(
            temp.path(),
            BuildOptions {
                registry: Some("registry.example.com".to_string()),
                push: true,
                ..BuildOptions::default()
            },
        );
        let runner = host(temp.path().join("gopath"), |_| ProcessOutput::ok(""));

        let summary = run(&config, &runner).await.unwrap();

        assert_eq!(summary.outcome, ImageOutcome::Pushed);
        assert!(summary.warnings.is_empty());
        assert_eq!(summary.reference, "registry.example.com/otelcol-custom:latest");
        let build = runner.find("docker", &["buildx", "build"]).unwrap();
        assert!(build.has_arg("--push"));
    }

    #[tokio::test]
    async fn test_non_linux_entries_are_not_compiled() {
        let temp = TempDir::new().unwrap();
        let config = project(
            temp.path(),
            BuildOptions {
                platforms: Some("linux/amd64,windows/amd64,darwin/arm64".to_string()),
                ..BuildOptions::default()
            },
        );
        let runner = host(temp.path().join("gopath"), |_| ProcessOutput::ok(""));

        let summary = run(&config, &runner).await.unwrap();

        assert_eq!(summary.compiled.len(), 1);
        assert_eq!(summary.skipped.len(), 2);
        assert!(!temp.path().join("dist/arm64").exists());
        assert_eq!(
            runner
                .invocations()
                .iter()
                .filter(|inv| inv.program_name() == "ocb" && !inv.has_arg("version"))
                .count(),
            1
        );
        let build = runner.find("docker", &["buildx", "build"]).unwrap();
        assert!(build.has_arg("linux/amd64,windows/amd64,darwin/arm64"));
    }

    #[tokio::test]
    async fn test_compile_failure_stops_before_image() {
        let temp = TempDir::new().unwrap();
        let config = project(temp.path(), BuildOptions::default());
        let gopath = temp.path().join("gopath");
        let runner = RecordingRunner::new()
            .with_program("go", "/usr/local/go/bin/go")
            .with_program("docker", "/usr/bin/docker")
            .with_handler(move |inv| match inv.program_name().as_str() {
                "go" if inv.has_arg("GOPATH") => ProcessOutput::ok(gopath.display().to_string()),
                "go" if inv.has_arg("install") => {
                    crate::test_utils::write_executable(&gopath.join("bin/builder"));
                    ProcessOutput::ok("")
                }
                "ocb" if inv.env_var("GOARCH") == Some("arm64") => {
                    ProcessOutput::failed(2, "undefined: component")
                }
                "ocb" => fake_ocb_build(inv, "otelcol-custom"),
                _ => ProcessOutput::ok(""),
            });

        let err = run(&config, &runner).await.unwrap_err();

        assert!(matches!(
            err,
            OtelpackError::Compile(CompileError::BuildFailed { .. })
        ));
        assert_eq!(runner.count("docker", &["buildx", "build"]), 0);
        assert!(!temp.path().join("build").exists());
    }

    #[tokio::test]
    async fn test_provisioning_happens_before_compile() {
        let temp = TempDir::new().unwrap();
        let config = project(temp.path(), BuildOptions::default());
        let runner = host(temp.path().join("gopath"), |_| ProcessOutput::ok(""));

        run(&config, &runner).await.unwrap();

        let invocations = runner.invocations();
        let position =
            |pred: &dyn Fn(&Invocation) -> bool| invocations.iter().position(pred).unwrap();
        let install = position(&|inv| inv.program_name() == "go" && inv.has_arg("install"));
        let first_compile = position(&|inv| inv.program_name() == "ocb" && !inv.has_arg("version"));
        let image = position(&|inv| inv.args.get(1).map(String::as_str) == Some("build"));
        assert!(install < first_compile);
        assert!(first_compile < image);
    }
}
