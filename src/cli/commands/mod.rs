//! CLI command implementations.

pub mod parse;
pub mod plan;
pub mod process;
