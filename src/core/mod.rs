//! Core build logic
//!
//! Configuration resolution and the three pipeline stages. External tools
//! are reached only through [`crate::infra::process::ProcessRunner`].
//!
//! # Submodules
//!
//! - [`platform`] - Target platform parsing
//! - [`config`] - Resolved, validated build configuration
//! - [`global_config`] - Optional user config file
//! - [`build_env`] - Cross-compile environment per platform
//! - [`compile`] - Per-architecture collector builds
//! - [`image`] - Build context staging and the buildx build
//! - [`pipeline`] - Stage orchestration

pub mod build_env;
pub mod compile;
pub mod config;
pub mod global_config;
pub mod image;
pub mod pipeline;
pub mod platform;
