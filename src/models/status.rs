//! Batch processing status model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchState {
    #[default]
    Idle,
    Running,
    Completed,
    Stopped,
}

impl BatchState {
    /// Whether a new batch may start from this state.
    pub fn can_start(&self) -> bool {
        !matches!(self, BatchState::Running)
    }
}

/// Read-only copy of the batch status, as handed to pollers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStatus {
    /// Id of the current or last run.
    pub run_id: Option<Uuid>,
    /// Lifecycle state.
    pub state: BatchState,
    /// Files in the batch.
    pub total_files: usize,
    /// Files finished (successfully or not).
    pub processed_count: usize,
    /// File being processed.
    pub current_file: Option<String>,
    /// Append-only log.
    pub log_entries: Vec<String>,
    /// Mirrors `state == Running`.
    pub is_running: bool,
    /// A stop was requested and not yet observed.
    pub cancel_requested: bool,
    /// When the run started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the run completed or stopped.
    pub finished_at: Option<DateTime<Utc>>,
}

impl ProcessingStatus {
    /// Progress in percent.
    pub fn percent(&self) -> u8 {
        if self.total_files == 0 {
            return 100;
        }
        ((self.processed_count * 100) / self.total_files).min(100) as u8
    }
}
