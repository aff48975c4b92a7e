//! Decides which debounced changes reach the hot update actor.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::actor::messages::HotUpdateMsg;
use crate::config::ProjectConfig;
use crate::utils::path::{is_within, normalize_path};

/// Directories under the project root that never trigger updates.
const IGNORED_DIRS: &[&str] = &[".git", "node_modules", "target"];

/// Watch filter derived from the active config.
pub(super) struct WatchFilter {
    config_path: PathBuf,
    ignored_dirs: Vec<PathBuf>,
    ignored_files: Vec<PathBuf>,
}

impl WatchFilter {
    pub(super) fn from_config(config: &ProjectConfig) -> Self {
        let root = config.get_root();
        let mut ignored_dirs: Vec<_> = IGNORED_DIRS.iter().map(|dir| root.join(dir)).collect();
        // Snapshots are written by the build itself.
        ignored_dirs.push(normalize_path(&config.build.saved));

        Self {
            config_path: normalize_path(&config.config_path),
            ignored_dirs,
            ignored_files: vec![normalize_path(&config.build.ready)],
        }
    }

    pub(super) fn is_ignored(&self, path: &Path) -> bool {
        self.ignored_files.iter().any(|file| file == path)
            || self.ignored_dirs.iter().any(|dir| is_within(path, dir))
    }

    /// Turn a debounced batch into actor messages.
    ///
    /// Removed files are only logged; the config file is reported on its own.
    pub(super) fn route(&self, changes: FxHashMap<PathBuf, ChangeKind>) -> Vec<HotUpdateMsg> {
        let mut config_changed = false;
        let mut changed = Vec::new();

        for (path, kind) in changes {
            if path == self.config_path {
                config_changed |= kind != ChangeKind::Removed;
                continue;
            }
            if self.is_ignored(&path) {
                continue;
            }
            match kind {
                ChangeKind::Removed => {
                    crate::debug!("watch"; "{}: {}", kind.label(), path.display());
                }
                ChangeKind::Created | ChangeKind::Modified => {
                    crate::debug!("watch"; "{}: {}", kind.label(), path.display());
                    changed.push(path);
                }
            }
        }

        changed.sort();

        let mut messages = Vec::new();
        if config_changed {
            messages.push(HotUpdateMsg::ConfigChanged);
        }
        if !changed.is_empty() {
            messages.push(HotUpdateMsg::Changed(changed));
        }
        messages
    }
}
