//! External module paths

/// Go module path of the OpenTelemetry Collector Builder
pub const OCB_MODULE: &str = "go.opentelemetry.io/collector/cmd/builder";

/// Go download page
pub const GO_DOWNLOAD: &str = "https://go.dev/dl/";

/// Docker buildx install docs
pub const BUILDX_DOCS: &str = "https://docs.docker.com/build/install-buildx/";
