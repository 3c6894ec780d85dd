//! Configuration loading
//!
//! Hierarchical configuration merging: defaults, YAML file, then
//! environment variables.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
