//! Default configuration values

/// Default image repository name
pub const DEFAULT_IMAGE: &str = "otelcol-custom";

/// Default image tag
pub const DEFAULT_TAG: &str = "latest";

/// Default platform list
pub const DEFAULT_PLATFORMS: &str = "linux/amd64,linux/arm64";

/// Default OCB version
pub const DEFAULT_OCB_VERSION: &str = "0.116.0";

/// Default packaging descriptor
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// Default runtime collector configuration
pub const DEFAULT_COLLECTOR_CONFIG: &str = "config.yaml";

/// Default per-architecture output root
pub const DEFAULT_DIST_DIR: &str = "dist";

/// Default staging directory handed to buildx
pub const DEFAULT_STAGING_DIR: &str = "build";

/// Default buildx builder instance name
pub const DEFAULT_BUILDER_NAME: &str = "otelpack-multiarch";

/// Only OS we cross-compile for
pub const SUPPORTED_OS: &str = "linux";

/// Name every produced collector binary is normalized to
pub const CANONICAL_BINARY: &str = "otelcol-contrib";

/// Prefix OCB output binaries are matched by
pub const BINARY_PREFIX: &str = "otelcol";

/// Where the provisioned OCB lives, relative to the working directory
pub const OCB_LOCAL_PATH: &str = "bin/ocb";

/// Name of the executable `go install` produces for OCB
pub const OCB_INSTALLED_NAME: &str = "builder";

/// Link flags for fully static collector binaries
pub const STATIC_LDFLAGS: &str = "-s -w -extldflags '-static'";

/// Directory inside the build context holding `<arch>/otelcol-contrib`
pub const STAGED_DIST_DIR: &str = "dist";
