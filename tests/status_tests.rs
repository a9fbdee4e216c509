//! Integration tests for the batch status tracker.
//!
//! Tests cover:
//! - Lifecycle transitions (idle, running, completed, stopped)
//! - Rejected double starts
//! - Cooperative stop at file boundaries
//! - Concurrent readers

use mkv_cleaner::core::status::StatusTracker;
use mkv_cleaner::models::status::BatchState;
use mkv_cleaner::Error;
use std::sync::Arc;
use std::thread;

#[test]
fn test_start_resets_status() {
    let tracker = StatusTracker::new();
    let run_id = tracker.start(3).unwrap();

    let status = tracker.snapshot();
    assert_eq!(status.run_id, Some(run_id));
    assert_eq!(status.state, BatchState::Running);
    assert!(status.is_running);
    assert_eq!(status.total_files, 3);
    assert_eq!(status.processed_count, 0);
    assert_eq!(status.log_entries.len(), 1);
    assert!(status.started_at.is_some());
}

#[test]
fn test_start_while_running_is_rejected() {
    let tracker = StatusTracker::new();
    let run_id = tracker.start(3).unwrap();
    assert!(tracker.checkpoint("a.mkv"));
    tracker.advance("a.mkv", "✓ Completed: a.mkv");
    let before = tracker.snapshot();

    let result = tracker.start(10);
    assert!(matches!(result, Err(Error::BatchAlreadyRunning)));

    let after = tracker.snapshot();
    assert_eq!(after.run_id, Some(run_id));
    assert_eq!(after.total_files, 3);
    assert_eq!(after.processed_count, before.processed_count);
    assert_eq!(after.log_entries, before.log_entries);
    assert_eq!(after.current_file, before.current_file);
}

#[test]
fn test_advance_to_completion() {
    let tracker = StatusTracker::new();
    tracker.start(2).unwrap();

    tracker.checkpoint("a.mkv");
    tracker.advance("a.mkv", "✓ Completed: a.mkv");
    let mid = tracker.snapshot();
    assert_eq!(mid.state, BatchState::Running);
    assert_eq!(mid.processed_count, 1);
    assert_eq!(mid.current_file.as_deref(), Some("a.mkv"));
    assert_eq!(mid.percent(), 50);

    tracker.checkpoint("b.mkv");
    tracker.advance("b.mkv", "✗ Failed: b.mkv: mkvmerge exited with 2");
    let done = tracker.snapshot();
    assert_eq!(done.state, BatchState::Completed);
    assert!(!done.is_running);
    assert_eq!(done.processed_count, 2);
    assert!(done.finished_at.is_some());
    assert!(done
        .log_entries
        .iter()
        .any(|l| l.contains("b.mkv") && l.contains("exited with 2")));
}

#[test]
fn test_stop_observed_at_next_boundary() {
    let tracker = StatusTracker::new();
    tracker.start(3).unwrap();

    assert!(tracker.checkpoint("a.mkv"));
    assert!(tracker.request_stop());
    // The file in flight still finishes.
    assert!(tracker.snapshot().is_running);
    tracker.advance("a.mkv", "✓ Completed: a.mkv");

    let status = tracker.snapshot();
    assert_eq!(status.state, BatchState::Stopped);
    assert_eq!(status.processed_count, 1);
    assert!(!status.is_running);
    assert!(!status.cancel_requested);

    assert!(!tracker.checkpoint("b.mkv"));
}

#[test]
fn test_stop_before_first_file() {
    let tracker = StatusTracker::new();
    tracker.start(2).unwrap();
    tracker.request_stop();

    assert!(!tracker.checkpoint("a.mkv"));
    let status = tracker.snapshot();
    assert_eq!(status.state, BatchState::Stopped);
    assert_eq!(status.processed_count, 0);
}

#[test]
fn test_restart_after_completion() {
    let tracker = StatusTracker::new();
    let first = tracker.start(1).unwrap();
    tracker.checkpoint("a.mkv");
    tracker.advance("a.mkv", "✓ Completed: a.mkv");

    let second = tracker.start(4).unwrap();
    assert_ne!(first, second);

    let status = tracker.snapshot();
    assert_eq!(status.state, BatchState::Running);
    assert_eq!(status.processed_count, 0);
    assert_eq!(status.total_files, 4);
    assert_eq!(status.log_entries.len(), 1);
    assert!(status.finished_at.is_none());
}

#[test]
fn test_request_stop_when_idle() {
    let tracker = StatusTracker::new();
    assert!(!tracker.request_stop());
    assert!(!tracker.snapshot().cancel_requested);
}

#[test]
fn test_advance_outside_batch_is_ignored() {
    let tracker = StatusTracker::new();
    tracker.advance("a.mkv", "✓ Completed: a.mkv");

    let status = tracker.snapshot();
    assert_eq!(status.state, BatchState::Idle);
    assert_eq!(status.processed_count, 0);
    assert!(status.log_entries.is_empty());
}

#[test]
fn test_concurrent_readers() {
    let tracker = Arc::new(StatusTracker::new());
    let total = 200;
    tracker.start(total).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                let mut last = 0;
                loop {
                    let status = tracker.snapshot();
                    assert!(status.processed_count >= last);
                    assert!(status.processed_count <= status.total_files);
                    last = status.processed_count;
                    if !status.is_running {
                        return status.state;
                    }
                    thread::yield_now();
                }
            })
        })
        .collect();

    let producer = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || {
            for i in 0..total {
                let name = format!("{}.mkv", i);
                assert!(tracker.checkpoint(&name));
                tracker.advance(&name, format!("✓ Completed: {}", name));
            }
        })
    };

    producer.join().unwrap();
    for reader in readers {
        assert_eq!(reader.join().unwrap(), BatchState::Completed);
    }
    assert_eq!(tracker.snapshot().processed_count, total);
}

#[test]
fn test_concurrent_starts_only_one_wins() {
    let tracker = Arc::new(StatusTracker::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || tracker.start(5).is_ok())
        })
        .collect();

    let wins = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(wins, 1);
}
