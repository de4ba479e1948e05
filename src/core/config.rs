//! Build configuration
//!
//! Turns raw option values into a fully resolved, validated [`BuildConfig`].
//! All validation happens here, before any external tool is invoked.
//!
//! Precedence for every optional value: CLI flag or environment variable,
//! then the global config file, then the built-in default.
//!
//! The dist and staging directories are wiped during a run, so neither may
//! contain the working directory or an input file, and they may not overlap.
//! Paths are compared lexically after resolving `.` and `..`.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::config::defaults;
use crate::core::global_config::GlobalConfig;
use crate::core::platform::{Platform, PlatformList};
use crate::error::ConfigError;

/// Option values as supplied by the user, before defaults
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Collector manifest passed to OCB
    pub manifest: PathBuf,
    /// Image repository name
    pub image: Option<String>,
    /// Image tag
    pub tag: Option<String>,
    /// Comma-separated platform list
    pub platforms: Option<String>,
    /// Registry prefix for the image reference
    pub registry: Option<String>,
    /// Push the image instead of a build-only run
    pub push: bool,
    /// Disable the buildx cache
    pub no_cache: bool,
    /// OCB version to provision
    pub ocb_version: Option<String>,
    /// Packaging descriptor
    pub dockerfile: Option<PathBuf>,
    /// Runtime collector configuration copied into the image
    pub collector_config: Option<PathBuf>,
    /// Per-architecture output root
    pub dist_dir: Option<PathBuf>,
    /// Staging directory handed to buildx
    pub staging_dir: Option<PathBuf>,
}

/// Fully resolved configuration; immutable for the rest of the run
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory relative paths were resolved against
    pub work_dir: PathBuf,
    /// Collector manifest
    pub manifest: PathBuf,
    /// Image repository name
    pub image: String,
    /// Image tag
    pub tag: String,
    /// Registry prefix, without trailing slash
    pub registry: Option<String>,
    /// Requested platforms
    pub platforms: PlatformList,
    /// Push to the registry
    pub push: bool,
    /// Disable the buildx cache
    pub no_cache: bool,
    /// OCB version to provision
    pub ocb_version: semver::Version,
    /// Packaging descriptor
    pub dockerfile: PathBuf,
    /// Runtime collector configuration
    pub collector_config: PathBuf,
    /// Per-architecture output root
    pub dist_dir: PathBuf,
    /// Staging directory
    pub staging_dir: PathBuf,
    /// Buildx builder instance name
    pub builder_name: String,
}

impl BuildConfig {
    /// Apply defaults and validate
    pub fn resolve(
        options: BuildOptions,
        global: &GlobalConfig,
        work_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let file = &global.defaults;

        let manifest = work_dir.join(&options.manifest);
        if !manifest.exists() {
            return Err(ConfigError::ManifestNotFound {
                path: options.manifest,
            });
        }
        if !manifest.is_file() {
            return Err(ConfigError::ManifestNotFile {
                path: options.manifest,
            });
        }

        let image = pick(options.image, file.image.as_ref(), defaults::DEFAULT_IMAGE);
        if image.trim().is_empty() {
            return Err(ConfigError::EmptyValue { field: "Image name" });
        }
        let tag = pick(options.tag, file.tag.as_ref(), defaults::DEFAULT_TAG);
        if tag.trim().is_empty() {
            return Err(ConfigError::EmptyValue { field: "Tag" });
        }

        let registry = options
            .registry
            .or_else(|| file.registry.clone())
            .map(|r| r.trim().trim_end_matches('/').to_string())
            .filter(|r| !r.is_empty());

        let raw_platforms = pick(
            options.platforms,
            file.platforms.as_ref(),
            defaults::DEFAULT_PLATFORMS,
        );
        let platforms = PlatformList::parse(&raw_platforms)?;
        if !platforms.has_supported() {
            return Err(ConfigError::NoSupportedPlatforms {
                platforms: raw_platforms,
            });
        }

        let ocb_version = parse_ocb_version(&pick(
            options.ocb_version,
            file.ocb_version.as_ref(),
            defaults::DEFAULT_OCB_VERSION,
        ))?;

        let dockerfile = work_dir.join(
            options
                .dockerfile
                .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_DOCKERFILE)),
        );
        require_file("Dockerfile", &dockerfile)?;

        let collector_config = work_dir.join(
            options
                .collector_config
                .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_COLLECTOR_CONFIG)),
        );
        require_file("Collector config", &collector_config)?;

        let dist_dir = normalize(&work_dir.join(
            options
                .dist_dir
                .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_DIST_DIR)),
        ));
        let staging_dir = normalize(&work_dir.join(
            options
                .staging_dir
                .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_STAGING_DIR)),
        ));

        let inputs = [
            normalize(&manifest),
            normalize(&dockerfile),
            normalize(&collector_config),
        ];
        let work_root = normalize(work_dir);
        ensure_disposable("dist directory", &dist_dir, &work_root, &inputs)?;
        ensure_disposable("staging directory", &staging_dir, &work_root, &inputs)?;
        if staging_dir.starts_with(&dist_dir) || dist_dir.starts_with(&staging_dir) {
            return Err(ConfigError::UnsafeDirectory {
                kind: "staging directory",
                reason: format!("it overlaps the dist directory {}", dist_dir.display()),
                path: staging_dir,
            });
        }
        ensure_distinct_staged_names(&inputs)?;

        let builder_name = file
            .builder_name
            .clone()
            .unwrap_or_else(|| defaults::DEFAULT_BUILDER_NAME.to_string());

        Ok(Self {
            work_dir: work_dir.to_path_buf(),
            manifest,
            image,
            tag,
            registry,
            platforms,
            push: options.push,
            no_cache: options.no_cache,
            ocb_version,
            dockerfile,
            collector_config,
            dist_dir,
            staging_dir,
            builder_name,
        })
    }

    /// Full image reference, registry-prefixed when a registry is set
    pub fn image_reference(&self) -> String {
        match &self.registry {
            Some(registry) => format!("{registry}/{}:{}", self.image, self.tag),
            None => format!("{}:{}", self.image, self.tag),
        }
    }

    /// Where the provisioned OCB executable lives
    pub fn ocb_path(&self) -> PathBuf {
        self.work_dir.join(defaults::OCB_LOCAL_PATH)
    }

    /// Output directory OCB writes the binary for `platform` into
    pub fn output_dir(&self, platform: &Platform) -> PathBuf {
        self.dist_dir.join(platform.dist_dir_name())
    }
}

/// Parse an OCB version, accepting an optional leading `v`
pub fn parse_ocb_version(raw: &str) -> Result<semver::Version, ConfigError> {
    let trimmed = raw.trim();
    semver::Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed)).map_err(|e| {
        ConfigError::InvalidVersion {
            version: raw.to_string(),
            error: e.to_string(),
        }
    })
}

fn pick(cli: Option<String>, file: Option<&String>, default: &str) -> String {
    cli.or_else(|| file.cloned())
        .unwrap_or_else(|| default.to_string())
}

fn require_file(kind: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::MissingInput {
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// Resolve `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Fail if wiping `dir` would take the working directory or an input with it
fn ensure_disposable(
    kind: &'static str,
    dir: &Path,
    work_dir: &Path,
    inputs: &[PathBuf],
) -> Result<(), ConfigError> {
    let reason = if work_dir.starts_with(dir) {
        Some("it contains the working directory".to_string())
    } else {
        inputs
            .iter()
            .find(|input| input.starts_with(dir))
            .map(|input| format!("it contains {}", input.display()))
    };

    match reason {
        Some(reason) => Err(ConfigError::UnsafeDirectory {
            kind,
            path: dir.to_path_buf(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Inputs are staged by file name next to `dist/`; names must not collide
fn ensure_distinct_staged_names(inputs: &[PathBuf]) -> Result<(), ConfigError> {
    let reserved = PathBuf::from(defaults::STAGED_DIST_DIR);
    let mut staged: Vec<(&OsStr, &Path)> = vec![(reserved.as_os_str(), reserved.as_path())];

    for input in inputs {
        let Some(name) = input.file_name() else {
            continue;
        };
        if let Some((_, first)) = staged
            .iter()
            .find(|(seen, path)| *seen == name && *path != input.as_path())
        {
            return Err(ConfigError::StagedNameClash {
                name: name.to_string_lossy().into_owned(),
                first: first.to_path_buf(),
                second: input.clone(),
            });
        }
        staged.push((name, input.as_path()));
    }

    Ok(())
}
