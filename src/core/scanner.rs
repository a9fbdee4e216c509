//! Input scanner module.
//!
//! Collects the MKV files to process from a single file or a directory tree.
//! Output folders (`processed/` and the configured output folder) are never
//! rescanned.

use crate::models::config::PROCESSED_DIR_NAME;
use crate::utils::fs::is_mkv_file;
use crate::Result;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Result of scanning an input path.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// MKV files found, sorted by path.
    pub files: Vec<PathBuf>,
    /// Total files looked at.
    pub total_files_scanned: usize,
    /// Output directories that were skipped.
    pub skipped_dirs: Vec<PathBuf>,
}

impl ScanResult {
    /// Filenames of the files found.
    pub fn filenames(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .collect()
    }
}

fn is_output_dir(entry: &DirEntry, output_folder: Option<&Path>) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    if entry
        .file_name()
        .to_string_lossy()
        .eq_ignore_ascii_case(PROCESSED_DIR_NAME)
    {
        return true;
    }
    output_folder.map_or(false, |output| {
        entry
            .path()
            .canonicalize()
            .map_or(false, |dir| dir == output)
    })
}

/// Scan a file or directory for MKV files.
///
/// A single `.mkv` file yields itself. A directory is walked recursively,
/// skipping `processed/` folders and `output_folder` when it lies inside the tree.
pub fn scan_path(path: &Path, output_folder: Option<&Path>) -> Result<ScanResult> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }

    let mut result = ScanResult::default();

    if path.is_file() {
        result.total_files_scanned = 1;
        if is_mkv_file(path) {
            result.files.push(path.to_path_buf());
        } else {
            tracing::warn!("Not an MKV file: {}", path.display());
        }
        return Ok(result);
    }

    // A configured folder that does not exist yet cannot be inside the tree.
    let output_folder = output_folder.and_then(|p| p.canonicalize().ok());

    let mut skipped = Vec::new();
    let walker = WalkDir::new(path).follow_links(false).into_iter();
    for entry in walker.filter_entry(|e| {
        if is_output_dir(e, output_folder.as_deref()) {
            tracing::debug!("Skipping output directory: {}", e.path().display());
            skipped.push(e.path().to_path_buf());
            false
        } else {
            true
        }
    }) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() {
            result.total_files_scanned += 1;
            if is_mkv_file(entry.path()) {
                result.files.push(entry.into_path());
            }
        }
    }

    result.skipped_dirs = skipped;
    result.files.sort();
    result.skipped_dirs.sort();

    tracing::info!(
        "Scanned {} files: {} MKV, {} output dir(s) skipped",
        result.total_files_scanned,
        result.files.len(),
        result.skipped_dirs.len()
    );

    Ok(result)
}
