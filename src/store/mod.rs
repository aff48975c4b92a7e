//! Append-only version history of builds.
//!
//! Layout:
//!
//! ```text
//! <base>/
//! └── <module-name>/
//!     ├── v1/
//!     │   ├── component.tsx        (draft copy)
//!     │   └── component-ready.tsx  (ready copy)
//!     ├── v2/
//!     └── ...
//! ```
//!
//! A commit writes both files into a private staging directory first and
//! then renames it to `v<N>`. The rename only succeeds while `v<N>` is
//! free, so two concurrent commits for the same module can never claim the
//! same number, and a `v<N>` directory is either complete or was left by
//! something else. Directories missing either file are not listed.
//! A committed version is never written again.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// Upper bound on reservation attempts for a single commit.
const MAX_RESERVE_ATTEMPTS: u32 = 64;

/// Prefix of staging directories; never parsed as a version.
const STAGING_PREFIX: &str = ".staging-";

/// Distinguishes staging directories of one process.
static STAGING_SEQ: AtomicU32 = AtomicU32::new(0);

/// Default file name for the draft copy inside a version directory.
pub const DEFAULT_DRAFT_FILE: &str = "component.tsx";
/// Default file name for the ready copy inside a version directory.
pub const DEFAULT_READY_FILE: &str = "component-ready.tsx";

/// Version store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid module name `{0}`: must be a single path component")]
    InvalidModuleName(String),

    #[error("failed to create `{0}`")]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("failed to write `{0}`")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("failed to read `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("could not reserve a version for `{module}` after {attempts} attempts")]
    Exhausted { module: String, attempts: u32 },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A committed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub module: String,
    pub version: u32,
    pub dir: PathBuf,
}

impl Snapshot {
    /// Path relative to the store base, e.g. `alpha/v3`.
    pub fn label(&self) -> String {
        format!("{}/v{}", self.module, self.version)
    }
}

/// Versioned snapshot store rooted at an explicit base directory.
#[derive(Debug, Clone)]
pub struct VersionStore {
    base: PathBuf,
    draft_file: String,
    ready_file: String,
}

impl VersionStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            draft_file: DEFAULT_DRAFT_FILE.to_string(),
            ready_file: DEFAULT_READY_FILE.to_string(),
        }
    }

    /// Override the file names written into each version directory.
    pub fn with_file_names(mut self, draft: impl Into<String>, ready: impl Into<String>) -> Self {
        self.draft_file = draft.into();
        self.ready_file = ready.into();
        self
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn draft_file(&self) -> &str {
        &self.draft_file
    }

    pub fn ready_file(&self) -> &str {
        &self.ready_file
    }

    /// Commit a (draft, ready) pair as the next version of `module`.
    pub fn commit(&self, module: &str, draft: &str, ready: &str) -> Result<Snapshot> {
        let module_dir = self.module_dir(module)?;
        fs::create_dir_all(&module_dir)
            .map_err(|e| StoreError::CreateDir(module_dir.clone(), e))?;

        let staging = self.stage(&module_dir, draft, ready)?;
        let reserved = self.reserve(module, &module_dir, &staging);
        if reserved.is_err() {
            let _ = fs::remove_dir_all(&staging);
        }
        let (version, dir) = reserved?;

        crate::debug!("store"; "committed {}/v{}", module, version);
        Ok(Snapshot {
            module: module.to_string(),
            version,
            dir,
        })
    }

    /// Write both files into a fresh staging directory under `module_dir`.
    fn stage(&self, module_dir: &Path, draft: &str, ready: &str) -> Result<PathBuf> {
        let staging = module_dir.join(format!(
            "{STAGING_PREFIX}{}-{}",
            std::process::id(),
            STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir(&staging).map_err(|e| StoreError::CreateDir(staging.clone(), e))?;

        let written = [(&self.draft_file, draft), (&self.ready_file, ready)]
            .into_iter()
            .try_for_each(|(name, text)| {
                let path = staging.join(name);
                fs::write(&path, text).map_err(|e| StoreError::Write(path, e))
            });
        if let Err(e) = written {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }
        Ok(staging)
    }

    /// Committed versions of `module`, ascending. Unknown module yields none.
    pub fn list(&self, module: &str) -> Result<Vec<Snapshot>> {
        let module_dir = self.module_dir(module)?;
        let mut versions: Vec<_> = read_versions(&module_dir)?
            .into_iter()
            .filter(|&version| self.is_complete(&module_dir.join(format!("v{version}"))))
            .map(|version| Snapshot {
                module: module.to_string(),
                version,
                dir: module_dir.join(format!("v{version}")),
            })
            .collect();
        versions.sort_by_key(|s| s.version);
        Ok(versions)
    }

    /// Names of modules that have at least one committed version, sorted.
    pub fn modules(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.base) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Read(self.base.clone(), e)),
        };

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && validate_module_name(name).is_ok()
                && !self.list(name)?.is_empty()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn module_dir(&self, module: &str) -> Result<PathBuf> {
        validate_module_name(module)?;
        Ok(self.base.join(module))
    }

    /// Whether a version directory holds both files of a finished commit.
    fn is_complete(&self, dir: &Path) -> bool {
        dir.join(&self.draft_file).is_file() && dir.join(&self.ready_file).is_file()
    }

    /// Move `staging` to the next free version directory.
    ///
    /// Starts one past the highest existing version, complete or not, so
    /// numbers are never reused after an older version is deleted or left
    /// half-written. When another writer takes the number first, move on to
    /// the next one.
    fn reserve(&self, module: &str, module_dir: &Path, staging: &Path) -> Result<(u32, PathBuf)> {
        let exhausted = || StoreError::Exhausted {
            module: module.to_string(),
            attempts: MAX_RESERVE_ATTEMPTS,
        };

        let mut version = read_versions(module_dir)?
            .into_iter()
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(exhausted)?;

        for _ in 0..MAX_RESERVE_ATTEMPTS {
            let dir = module_dir.join(format!("v{version}"));
            if !dir.exists() {
                match fs::rename(staging, &dir) {
                    Ok(()) => return Ok((version, dir)),
                    Err(_) if dir.exists() => {}
                    Err(e) => return Err(StoreError::CreateDir(dir, e)),
                }
            }
            crate::debug!("store"; "v{} taken, retrying", version);
            version = version.checked_add(1).ok_or_else(exhausted)?;
        }

        Err(exhausted())
    }
}

/// Reject names that would escape the store base or collide with it.
pub fn validate_module_name(module: &str) -> Result<()> {
    let bad = module.is_empty()
        || module == "."
        || module == ".."
        || module.contains(['/', '\\'])
        || module.contains('\0');
    if bad {
        return Err(StoreError::InvalidModuleName(module.to_string()));
    }
    Ok(())
}

/// Parse a `v<N>` directory name.
fn parse_version(name: &str) -> Option<u32> {
    let digits = name.strip_prefix('v')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|&n| n > 0)
}

/// Version numbers present under a module directory.
fn read_versions(module_dir: &Path) -> Result<Vec<u32>> {
    let entries = match fs::read_dir(module_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::Read(module_dir.to_path_buf(), e)),
    };

    Ok(entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().and_then(parse_version))
        .collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, VersionStore) {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path().join("_SAVED"));
        (temp, store)
    }

    #[test]
    fn test_sequential_commits() {
        let (_temp, store) = store();

        for i in 1..=3u32 {
            let snap = store
                .commit("alpha", &format!("draft {i}"), &format!("ready {i}"))
                .unwrap();
            assert_eq!(snap.version, i);
            assert_eq!(snap.label(), format!("alpha/v{i}"));
        }

        for i in 1..=3u32 {
            let dir = store.base().join("alpha").join(format!("v{i}"));
            assert_eq!(
                fs::read_to_string(dir.join(DEFAULT_DRAFT_FILE)).unwrap(),
                format!("draft {i}")
            );
            assert_eq!(
                fs::read_to_string(dir.join(DEFAULT_READY_FILE)).unwrap(),
                format!("ready {i}")
            );
            assert_eq!(fs::read_dir(&dir).unwrap().count(), 2);
        }
    }

    #[test]
    fn test_modules_are_independent() {
        let (_temp, store) = store();
        store.commit("alpha", "a", "a").unwrap();
        store.commit("alpha", "a", "a").unwrap();
        let beta = store.commit("beta", "b", "b").unwrap();
        assert_eq!(beta.version, 1);
        assert_eq!(store.modules().unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_deleted_version_not_reused() {
        let (_temp, store) = store();
        store.commit("alpha", "1", "1").unwrap();
        store.commit("alpha", "2", "2").unwrap();
        store.commit("alpha", "3", "3").unwrap();

        fs::remove_dir_all(store.base().join("alpha/v2")).unwrap();

        let snap = store.commit("alpha", "4", "4").unwrap();
        assert_eq!(snap.version, 4);
        let versions: Vec<_> = store.list("alpha").unwrap().iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![1, 3, 4]);
    }

    #[test]
    fn test_existing_directory_is_skipped() {
        let (_temp, store) = store();
        // Simulate another writer that reserved v1 first
        fs::create_dir_all(store.base().join("alpha/v1")).unwrap();
        let snap = store.commit("alpha", "d", "r").unwrap();
        assert_eq!(snap.version, 2);
        assert!(!store.base().join("alpha/v1").join(DEFAULT_DRAFT_FILE).exists());
    }

    #[test]
    fn test_half_written_versions_are_not_listed() {
        let (_temp, store) = store();
        let module_dir = store.base().join("alpha");
        // Build interrupted after reserving v1, and after one file of v2.
        fs::create_dir_all(module_dir.join("v1")).unwrap();
        fs::create_dir_all(module_dir.join("v2")).unwrap();
        fs::write(module_dir.join("v2").join(DEFAULT_DRAFT_FILE), "d").unwrap();

        assert!(store.list("alpha").unwrap().is_empty());
        assert!(store.modules().unwrap().is_empty());

        let snap = store.commit("alpha", "d", "r").unwrap();
        assert_eq!(snap.version, 3);
        let listed: Vec<_> = store.list("alpha").unwrap().iter().map(|s| s.version).collect();
        assert_eq!(listed, vec![3]);
        assert_eq!(store.modules().unwrap(), vec!["alpha"]);
    }

    #[test]
    fn test_commit_leaves_no_staging_dirs() {
        let (_temp, store) = store();
        store.commit("alpha", "d", "r").unwrap();
        store.commit("alpha", "d", "r").unwrap();

        let mut names: Vec<_> = fs::read_dir(store.base().join("alpha"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["v1", "v2"]);
    }

    #[test]
    fn test_leftover_staging_dir_is_ignored() {
        let (_temp, store) = store();
        // A commit killed before its rename.
        let staging = store.base().join("alpha").join(format!("{STAGING_PREFIX}1-0"));
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join(DEFAULT_DRAFT_FILE), "d").unwrap();
        fs::write(staging.join(DEFAULT_READY_FILE), "r").unwrap();

        assert!(store.list("alpha").unwrap().is_empty());
        assert_eq!(store.commit("alpha", "d", "r").unwrap().version, 1);
    }

    #[test]
    fn test_highest_version_number_is_exhausted() {
        let (_temp, store) = store();
        fs::create_dir_all(store.base().join(format!("alpha/v{}", u32::MAX))).unwrap();

        assert!(matches!(
            store.commit("alpha", "d", "r"),
            Err(StoreError::Exhausted { .. })
        ));
        let entries = fs::read_dir(store.base().join("alpha")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_concurrent_commits_get_distinct_versions() {
        let (_temp, store) = store();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .commit("race", &format!("d{i}"), &format!("r{i}"))
                        .unwrap()
                        .version
                })
            })
            .collect();

        let mut versions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        versions.sort();
        assert_eq!(versions, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_module_names() {
        let (_temp, store) = store();
        for name in ["", ".", "..", "../escape", "a/b", "a\\b"] {
            assert!(
                matches!(
                    store.commit(name, "d", "r"),
                    Err(StoreError::InvalidModuleName(_))
                ),
                "{name:?}"
            );
        }
    }

    #[test]
    fn test_custom_file_names() {
        let (_temp, store) = store();
        let store = store.with_file_names("draft.tsx", "ready.tsx");
        let snap = store.commit("alpha", "d", "r").unwrap();
        assert!(snap.dir.join("draft.tsx").exists());
        assert!(snap.dir.join("ready.tsx").exists());
    }

    #[test]
    fn test_list_unknown_module() {
        let (_temp, store) = store();
        assert!(store.list("nothing").unwrap().is_empty());
        assert!(store.modules().unwrap().is_empty());
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("v1"), Some(1));
        assert_eq!(parse_version("v42"), Some(42));
        assert_eq!(parse_version("v0"), None);
        assert_eq!(parse_version("v"), None);
        assert_eq!(parse_version("v1a"), None);
        assert_eq!(parse_version("x1"), None);
        assert_eq!(parse_version("v+1"), None);
    }
}
