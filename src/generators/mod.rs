//! Output name generators.

pub mod filename;
