//! MKV Cleaner Library
//!
//! Renames MKV episodes and movies from their scene-style filenames and
//! filters embedded audio/subtitle tracks by language before remuxing with mkvmerge.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
