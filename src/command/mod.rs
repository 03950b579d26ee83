//! Command handlers invoked from the CLI.

pub mod apply;
