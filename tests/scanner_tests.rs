//! Integration tests for the scanner module.
//!
//! Tests cover:
//! - Directory scanning for MKV files
//! - Skipping output folders, including a configured one
//! - Single file input
//! - Error handling for non-existent paths

use mkv_cleaner::core::scanner::scan_path;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_scan_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let result = scan_path(temp_dir.path(), None).unwrap();

    assert!(result.files.is_empty());
    assert_eq!(result.total_files_scanned, 0);
}

#[test]
fn test_scan_finds_mkv_files_sorted() {
    let temp_dir = TempDir::new().unwrap();
    let season = temp_dir.path().join("Season 1");
    fs::create_dir(&season).unwrap();
    fs::write(season.join("Show.S01E02.mkv"), "fake").unwrap();
    fs::write(season.join("Show.S01E01.MKV"), "fake").unwrap();
    fs::write(season.join("Show.S01E01.srt"), "subs").unwrap();
    fs::write(temp_dir.path().join("movie.mp4"), "fake").unwrap();

    let result = scan_path(temp_dir.path(), None).unwrap();

    assert_eq!(result.files.len(), 2);
    assert_eq!(result.filenames(), vec!["Show.S01E01.MKV", "Show.S01E02.mkv"]);
    assert_eq!(result.total_files_scanned, 4);
}

#[test]
fn test_scan_skips_processed_folder() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.mkv"), "fake").unwrap();

    let processed = temp_dir.path().join("processed");
    fs::create_dir(&processed).unwrap();
    fs::write(processed.join("A - S01E01 - Episode #1.1.mkv"), "output").unwrap();

    let result = scan_path(temp_dir.path(), None).unwrap();

    assert_eq!(result.filenames(), vec!["a.mkv"]);
    assert_eq!(result.skipped_dirs, vec![processed]);
}

#[test]
fn test_scan_skips_configured_output_folder() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.mkv"), "fake").unwrap();

    let output = temp_dir.path().join("Cleaned");
    fs::create_dir(&output).unwrap();
    fs::write(output.join("A - S01E01 - Episode #1.1.mkv"), "output").unwrap();

    let result = scan_path(temp_dir.path(), Some(output.as_path())).unwrap();
    assert_eq!(result.filenames(), vec!["a.mkv"]);
    assert_eq!(result.skipped_dirs, vec![output.clone()]);

    // Without the setting the folder is ordinary input.
    let result = scan_path(temp_dir.path(), None).unwrap();
    assert_eq!(result.files.len(), 2);
}

#[test]
fn test_scan_root_named_processed_is_scanned() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("processed");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.mkv"), "fake").unwrap();

    let result = scan_path(&root, None).unwrap();
    assert_eq!(result.files.len(), 1);
}

#[test]
fn test_scan_single_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("Show.S01E01.mkv");
    fs::write(&file, "fake").unwrap();

    let result = scan_path(&file, None).unwrap();
    assert_eq!(result.files, vec![file]);

    let other = temp_dir.path().join("notes.txt");
    fs::write(&other, "text").unwrap();
    assert!(scan_path(&other, None).unwrap().files.is_empty());
}

#[test]
fn test_scan_nonexistent_path() {
    let result = scan_path(std::path::Path::new("/nonexistent/path/that/does/not/exist"), None);
    assert!(result.is_err());
}
