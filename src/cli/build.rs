//! `modkit build`: normalize the draft and record a version.
//!
//! ```text
//! read draft ──► normalize ──► write ready ──► name declared? ──► commit snapshot
//!    (fatal)                      (fatal)                          (logged only)
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use crate::config::{BuildConfig, ProjectConfig};
use crate::log;
use crate::store::{Snapshot, StoreError};

/// Failures that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot read draft `{0}`")]
    ReadDraft(PathBuf, #[source] io::Error),

    #[error("cannot write ready artifact `{0}`")]
    WriteReady(PathBuf, #[source] io::Error),
}

/// What happened to version history during a build.
#[derive(Debug)]
pub enum Versioning {
    /// No module-name declaration in the draft.
    Skipped,
    Committed(Snapshot),
    /// The ready artifact was written, but the snapshot was not.
    Failed { module: String, error: StoreError },
}

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    pub ready_path: PathBuf,
    pub versioning: Versioning,
}

/// Run a build with explicit paths.
///
/// Only reading the draft or writing the ready artifact can fail; a store
/// failure is reported in [`BuildReport::versioning`].
pub fn build_module(build: &BuildConfig) -> Result<BuildReport, BuildError> {
    let draft = fs::read_to_string(&build.draft)
        .map_err(|e| BuildError::ReadDraft(build.draft.clone(), e))?;

    let normalized = build.normalizer().normalize(&draft);
    write_ready(&build.ready, &normalized.ready)?;

    let versioning = match normalized.module_name {
        None => Versioning::Skipped,
        Some(module) => match build.store().commit(&module, &draft, &normalized.ready) {
            Ok(snapshot) => Versioning::Committed(snapshot),
            Err(error) => Versioning::Failed { module, error },
        },
    };

    Ok(BuildReport {
        ready_path: build.ready.clone(),
        versioning,
    })
}

fn write_ready(path: &Path, text: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteReady(path.to_path_buf(), e))?;
    }
    fs::write(path, text).map_err(|e| BuildError::WriteReady(path.to_path_buf(), e))
}

/// Entry point for `modkit build`.
pub fn run(config: &ProjectConfig) -> Result<()> {
    let report = build_module(&config.build)?;

    log!("build"; "wrote {}", config.root_relative(&report.ready_path).display());
    match report.versioning {
        Versioning::Skipped => {
            log!("build"; "no module name declared, skipping versioning");
        }
        Versioning::Committed(snapshot) => {
            log!("build"; "saved {}", snapshot.label());
        }
        Versioning::Failed { module, error } => {
            log!("error"; "failed to save a version of `{}`: {:#}", module, anyhow::Error::new(error));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DRAFT: &str = "import * as React from 'react'\n\
const CustomModuleName = 'alpha'\n\
// Choose a CustomModuleName for this script to automatically version\n\
\n\
const Component = () => <div/>\n\
\n\
// For development, will be removed in build\n\
export default Component\n";

    fn project() -> (TempDir, BuildConfig) {
        let temp = TempDir::new().unwrap();
        let mut build = BuildConfig::default();
        build.normalize(temp.path());
        fs::create_dir_all(build.draft.parent().unwrap()).unwrap();
        (temp, build)
    }

    #[test]
    fn test_build_writes_ready_and_commits() {
        let (_temp, build) = project();
        fs::write(&build.draft, DRAFT).unwrap();

        let report = build_module(&build).unwrap();
        let ready = fs::read_to_string(&report.ready_path).unwrap();
        assert_eq!(ready, "const Component = () => <div/>\n\nComponent");

        let Versioning::Committed(snapshot) = report.versioning else {
            panic!("expected a committed snapshot");
        };
        assert_eq!(snapshot.label(), "alpha/v1");
        assert_eq!(
            fs::read_to_string(snapshot.dir.join("component.tsx")).unwrap(),
            DRAFT
        );
        assert_eq!(
            fs::read_to_string(snapshot.dir.join("component-ready.tsx")).unwrap(),
            ready
        );
    }

    #[test]
    fn test_repeated_builds_increment_versions() {
        let (_temp, build) = project();
        fs::write(&build.draft, DRAFT).unwrap();

        for expected in 1..=3 {
            let report = build_module(&build).unwrap();
            match report.versioning {
                Versioning::Committed(s) => assert_eq!(s.version, expected),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_no_module_name_skips_versioning() {
        let (_temp, build) = project();
        fs::write(&build.draft, "const Component = () => null\n").unwrap();

        let report = build_module(&build).unwrap();
        assert!(matches!(report.versioning, Versioning::Skipped));
        assert!(!build.saved.exists());
        assert!(build.ready.is_file());
    }

    #[test]
    fn test_missing_draft_is_fatal() {
        let (_temp, build) = project();
        let err = build_module(&build).unwrap_err();
        assert!(matches!(err, BuildError::ReadDraft(..)));
        assert!(!build.ready.exists());
    }

    #[test]
    fn test_store_failure_keeps_ready_artifact() {
        let (_temp, mut build) = project();
        fs::write(&build.draft, DRAFT).unwrap();
        // A file where the store base directory should be.
        let blocker = build.draft.parent().unwrap().join("blocker");
        fs::write(&blocker, "").unwrap();
        build.saved = blocker;

        let report = build_module(&build).unwrap();
        assert!(matches!(report.versioning, Versioning::Failed { ref module, .. } if module == "alpha"));
        assert!(build.ready.is_file());
    }

    #[test]
    fn test_empty_draft() {
        let (_temp, build) = project();
        fs::write(&build.draft, "").unwrap();

        let report = build_module(&build).unwrap();
        assert_eq!(fs::read_to_string(report.ready_path).unwrap(), "\n\nComponent");
    }
}
