//! External tool availability checking.
//!
//! Lookups return values instead of raising, so callers can report every
//! missing tool at once.

use std::path::PathBuf;

/// Tools the full pipeline invokes through `PATH`.
pub const REQUIRED_TOOLS: &[&str] = &["xcodebuild", "xcrun", "codesign", "hdiutil", "ditto"];

/// Location of `program` on `PATH`, if any.
pub fn locate(program: &str) -> Option<PathBuf> {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program, path.display());
            Some(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", program, e);
            None
        }
    }
}

/// Entries of [`REQUIRED_TOOLS`] that [`locate`] cannot find.
pub fn missing_tools() -> Vec<&'static str> {
    REQUIRED_TOOLS
        .iter()
        .copied()
        .filter(|tool| locate(tool).is_none())
        .collect()
}
