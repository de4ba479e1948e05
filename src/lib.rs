//! otelpack - Multi-architecture OpenTelemetry Collector image builder
//!
//! Builds a custom collector with the OpenTelemetry Collector Builder (OCB)
//! for every requested Linux architecture, then packages the binaries into
//! one multi-platform container image with Docker buildx.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Build configuration and the pipeline stages
//! - [`infra`] - Infrastructure layer (filesystem, processes, external tools)
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
