//! External tool services.

pub mod mkvmerge;
pub mod subtitle;
