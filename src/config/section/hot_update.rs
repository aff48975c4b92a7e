//! `[hot_update]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [hot_update]
//! file_pattern = "src/module/component.tsx"  # Suffix matched against changed paths
//! command = "modkit build"                   # Shell command run on a match
//! coalesce = true                            # Newer change supersedes a running build
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Dev-server hook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotUpdateConfig {
    /// Path suffix that claims a change event.
    pub file_pattern: String,

    /// Shell command run for claimed events.
    pub command: String,

    /// Keep at most one build in flight.
    pub coalesce: bool,
}

impl Default for HotUpdateConfig {
    fn default() -> Self {
        Self {
            file_pattern: "src/module/component.tsx".to_string(),
            command: "modkit build".to_string(),
            coalesce: true,
        }
    }
}

impl HotUpdateConfig {
    pub const FILE_PATTERN: FieldPath = FieldPath::new("hot_update.file_pattern");
    pub const COMMAND: FieldPath = FieldPath::new("hot_update.command");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.file_pattern.trim().is_empty() {
            diag.error_with_hint(
                Self::FILE_PATTERN,
                "file pattern is empty, no change would ever match",
                "set it to the draft path, e.g. \"src/module/component.tsx\"",
            );
        }
        if self.command.trim().is_empty() {
            diag.error(Self::COMMAND, "command must not be empty");
        }
    }
}
