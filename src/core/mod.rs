//! Core business logic modules.

pub mod executor;
pub mod parser;
pub mod planner;
pub mod scanner;
pub mod selector;
pub mod status;
