//! Error types for the MKV cleaner.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the MKV cleaner.
#[derive(Error, Debug)]
pub enum Error {
    // Preflight errors
    #[error("mkvmerge not found. Install MKVToolNix: sudo apt install mkvtoolnix")]
    MkvmergeNotFound,

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Mux engine errors
    #[error("Failed to read tracks: {0}")]
    ProbeError(String),

    #[error("Remux failed: {0}")]
    MuxError(String),

    #[error("Subtitle conversion failed: {0}")]
    SubtitleError(String),

    // Batch errors
    #[error("A batch is already in progress")]
    BatchAlreadyRunning,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
