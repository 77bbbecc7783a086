//! CLI-specific functionality for gridboot
//!
//! This module contains argument parsing and configuration discovery.

pub mod args;
pub mod config;

pub use args::{Args, ExecutionMode, ResolveConfig, StartConfig};
pub use config::ConfigDiscovery;
