//! Internal layer: patch engine and run configuration.

pub mod config;
pub mod patch;
