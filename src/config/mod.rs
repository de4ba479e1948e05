//! Configuration constants
//!
//! - [`defaults`] - Built-in defaults for every optional setting
//! - [`urls`] - External module paths and documentation links

pub mod defaults;
pub mod urls;
