//! File system utilities.

use std::path::{Path, PathBuf};

/// Get file extension in lowercase.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Check if a file is a Matroska video based on extension.
pub fn is_mkv_file(path: &Path) -> bool {
    get_extension(path).map(|ext| ext == "mkv").unwrap_or(false)
}

/// Insert a ` (n)` disambiguator before the extension.
///
/// `/out/Show.mkv` with `n = 2` becomes `/out/Show (2).mkv`.
pub fn with_numeric_suffix(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let filename = match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    };
    path.with_file_name(filename)
}
