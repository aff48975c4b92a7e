//! Pre-initialization validation.
//!
//! Init never overwrites: every file it would write must be absent.

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Fail if any of `files` (relative to `root`) already exists.
pub fn validate_target(root: &Path, files: &[PathBuf]) -> Result<()> {
    let existing: Vec<_> = files
        .iter()
        .filter(|file| root.join(file).exists())
        .map(|file| file.display().to_string())
        .collect();

    if !existing.is_empty() {
        bail!(
            "refusing to overwrite existing files in '{}':\n- {}",
            root.display(),
            existing.join("\n- ")
        );
    }
    Ok(())
}
