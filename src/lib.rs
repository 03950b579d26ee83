//! Applies `.smalipatch` files to a tree of disassembled smali sources.

pub mod cli;
pub mod command;
pub mod internal;
pub mod utils;
