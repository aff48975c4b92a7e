//! `[build]` section configuration.
//!
//! Paths of the draft module, its ready artifact, and the version store.
//!
//! # Example
//!
//! ```toml
//! [build]
//! draft = "src/module/component.tsx"        # Draft module edited by the author
//! ready = "src/module/component-ready.tsx"  # Normalized artifact
//! saved = "src/module/_SAVED"               # Version store base directory
//! strip_prefixes = ["// Local note"]        # Extra scaffold comments to strip
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::normalize::Normalizer;
use crate::store::{DEFAULT_DRAFT_FILE, DEFAULT_READY_FILE, VersionStore};

/// Build paths and normalizer extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Draft module path.
    pub draft: PathBuf,

    /// Ready artifact path.
    pub ready: PathBuf,

    /// Version store base directory.
    pub saved: PathBuf,

    /// Additional line prefixes removed by the normalizer.
    pub strip_prefixes: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            draft: PathBuf::from("src/module").join(DEFAULT_DRAFT_FILE),
            ready: PathBuf::from("src/module").join(DEFAULT_READY_FILE),
            saved: PathBuf::from("src/module/_SAVED"),
            strip_prefixes: Vec::new(),
        }
    }
}

impl BuildConfig {
    pub const DRAFT: FieldPath = FieldPath::new("build.draft");
    pub const READY: FieldPath = FieldPath::new("build.ready");

    /// Normalizer with the built-in rules plus `strip_prefixes`.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new().with_prefixes(self.strip_prefixes.iter().cloned())
    }

    /// Version store at `saved`, naming snapshot files after the draft and ready files.
    pub fn store(&self) -> VersionStore {
        VersionStore::new(&self.saved).with_file_names(
            file_name_or(&self.draft, DEFAULT_DRAFT_FILE),
            file_name_or(&self.ready, DEFAULT_READY_FILE),
        )
    }

    /// Resolve paths against the project root.
    pub(crate) fn normalize(&mut self, root: &Path) {
        self.draft = super::resolve(root, &self.draft);
        self.ready = super::resolve(root, &self.ready);
        self.saved = super::resolve(root, &self.saved);
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.draft.as_os_str().is_empty() {
            diag.error(Self::DRAFT, "draft path must not be empty");
        }
        if self.ready.as_os_str().is_empty() {
            diag.error(Self::READY, "ready path must not be empty");
        }
        if !self.draft.as_os_str().is_empty() && self.draft == self.ready {
            diag.error_with_hint(
                Self::READY,
                "ready artifact would overwrite the draft",
                "point `build.ready` at a different file",
            );
        }
    }
}

fn file_name_or(path: &Path, fallback: &str) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}
