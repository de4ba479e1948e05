//! CLI command implementations
//!
//! otelpack has a single action; it lives in [`build`].

pub mod build;
