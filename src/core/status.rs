//! Batch status tracking module.
//!
//! One producer (the batch loop) drives the tracker while any number of
//! readers take snapshots. All state sits behind a single mutex and is only
//! reachable through the operations below.

use crate::models::status::{BatchState, ProcessingStatus};
use crate::Result;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Shared, guarded batch status.
#[derive(Debug, Default)]
pub struct StatusTracker {
    inner: Mutex<ProcessingStatus>,
}

impl StatusTracker {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ProcessingStatus> {
        // The status is plain data, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new batch, resetting counters and the log.
    ///
    /// Rejected while another batch is running; the current status is left untouched.
    pub fn start(&self, total_files: usize) -> Result<Uuid> {
        let mut status = self.lock();
        if !status.state.can_start() {
            tracing::warn!("Rejected batch start: a batch is already running");
            return Err(crate::Error::BatchAlreadyRunning);
        }

        let run_id = Uuid::new_v4();
        *status = ProcessingStatus {
            run_id: Some(run_id),
            state: BatchState::Running,
            total_files,
            is_running: true,
            started_at: Some(Utc::now()),
            log_entries: vec![format!("Starting batch of {} file(s)", total_files)],
            ..Default::default()
        };

        if total_files == 0 {
            finish(&mut status, BatchState::Completed);
        }

        tracing::info!("Batch {} started with {} file(s)", run_id, total_files);
        Ok(run_id)
    }

    /// Per-file boundary. Marks `filename` as current and returns `true` if it
    /// may be processed; returns `false` (and stops the batch) when a stop was requested.
    pub fn checkpoint(&self, filename: &str) -> bool {
        let mut status = self.lock();
        if status.state != BatchState::Running {
            return false;
        }
        if status.cancel_requested {
            status.log_entries.push("Processing stopped by user".to_string());
            finish(&mut status, BatchState::Stopped);
            tracing::info!("Batch stopped before {}", filename);
            return false;
        }
        status.current_file = Some(filename.to_string());
        true
    }

    /// Record that `filename` is done (successfully or not).
    pub fn advance(&self, filename: &str, log_line: impl Into<String>) {
        let mut status = self.lock();
        if status.state != BatchState::Running {
            tracing::warn!("Ignoring progress for {} outside a running batch", filename);
            return;
        }

        status.processed_count += 1;
        status.current_file = Some(filename.to_string());
        status.log_entries.push(log_line.into());

        if status.processed_count >= status.total_files {
            status.log_entries.push("All files processed".to_string());
            finish(&mut status, BatchState::Completed);
            tracing::info!("Batch completed ({} file(s))", status.total_files);
        } else if status.cancel_requested {
            status.log_entries.push("Processing stopped by user".to_string());
            finish(&mut status, BatchState::Stopped);
            tracing::info!(
                "Batch stopped after {}/{} file(s)",
                status.processed_count,
                status.total_files
            );
        }
    }

    /// Ask the running batch to stop at the next file boundary.
    ///
    /// Returns `false` when no batch is running.
    pub fn request_stop(&self) -> bool {
        let mut status = self.lock();
        if status.state != BatchState::Running {
            return false;
        }
        if !status.cancel_requested {
            status.cancel_requested = true;
            tracing::info!("Stop requested");
        }
        true
    }

    /// Read-only copy of the current status.
    pub fn snapshot(&self) -> ProcessingStatus {
        self.lock().clone()
    }
}

fn finish(status: &mut ProcessingStatus, state: BatchState) {
    status.state = state;
    status.is_running = false;
    status.cancel_requested = false;
    status.current_file = None;
    status.finished_at = Some(Utc::now());
}
