//! Utilities module aggregator exposing path resolution and diff rendering helpers.

pub mod diff;
pub mod path;
