//! mkvmerge preflight check.

use super::CheckResult;
use crate::services::mkvmerge::Mkvmerge;

/// Check that the configured mkvmerge runs.
pub fn check(mkvmerge: &Mkvmerge) -> CheckResult {
    if mkvmerge.is_installed() {
        match mkvmerge.get_version() {
            Ok(version) => CheckResult::ok("mkvmerge", &format!("installed ({})", version)),
            Err(_) => CheckResult::ok("mkvmerge", "installed"),
        }
    } else {
        CheckResult::fail(
            "mkvmerge",
            &format!("not found at {}", mkvmerge.path().display()),
            "Install MKVToolNix (sudo apt install mkvtoolnix) or set paths.mkvmerge_path",
        )
    }
}

/// Check that mkvextract, needed for subtitle conversion, runs.
pub fn check_mkvextract(mkvmerge: &Mkvmerge) -> CheckResult {
    if mkvmerge.is_mkvextract_installed() {
        CheckResult::ok("mkvextract", "installed")
    } else {
        CheckResult::fail(
            "mkvextract",
            &format!("not found at {}", mkvmerge.mkvextract_path().display()),
            "Install MKVToolNix or drop subtitles.convert_to",
        )
    }
}
