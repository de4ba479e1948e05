//! otelpack CLI - Multi-architecture OpenTelemetry Collector image builder
//!
//! Entry point for the otelpack command-line application.

use anyhow::Result;

use otelpack::cli::output::{display_error, OutputConfig};
use otelpack::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Apply output configuration globally
    let output_config = OutputConfig::new(cli.quiet, cli.verbose);
    output_config.apply_global();

    // RUST_LOG wins over -v
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(output_config.log_directive().into())
                .from_env_lossy(),
        )
        .init();

    // Run the build and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
