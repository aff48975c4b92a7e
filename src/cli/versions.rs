//! `modkit versions [NAME]`: inspect saved module versions.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::config::ProjectConfig;
use crate::log;
use crate::store::{Snapshot, VersionStore};

/// One listed version with the sizes of its files.
#[derive(Debug, PartialEq, Eq)]
pub struct VersionEntry {
    pub version: u32,
    pub draft_bytes: Option<u64>,
    pub ready_bytes: Option<u64>,
}

/// Entry point for `modkit versions`.
pub fn run(config: &ProjectConfig, name: Option<&str>) -> Result<()> {
    let store = config.build.store();
    let base = config.root_relative(store.base());

    match name {
        None => {
            let modules = store
                .modules()
                .with_context(|| format!("Failed to list modules in '{}'", base.display()))?;
            if modules.is_empty() {
                log!("versions"; "no saved modules in {}", base.display());
            }
            for module in modules {
                let count = store.list(&module)?.len();
                println!("{} {}", module.bold(), format!("({count} versions)").dimmed());
            }
        }
        Some(name) => {
            let entries = entries(&store, name)?;
            if entries.is_empty() {
                log!("versions"; "no saved versions of `{}`", name);
            }
            for entry in entries {
                println!(
                    "{:>5}  draft {}  ready {}",
                    format!("v{}", entry.version).bold(),
                    size(entry.draft_bytes),
                    size(entry.ready_bytes),
                );
            }
        }
    }

    Ok(())
}

/// Versions of `module`, ascending.
pub fn entries(store: &VersionStore, module: &str) -> Result<Vec<VersionEntry>> {
    Ok(store
        .list(module)?
        .into_iter()
        .map(|snapshot| entry(store, &snapshot))
        .collect())
}

fn entry(store: &VersionStore, snapshot: &Snapshot) -> VersionEntry {
    VersionEntry {
        version: snapshot.version,
        draft_bytes: file_len(&snapshot.dir.join(store.draft_file())),
        ready_bytes: file_len(&snapshot.dir.join(store.ready_file())),
    }
}

fn file_len(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|m| m.len())
}

fn size(bytes: Option<u64>) -> String {
    match bytes {
        Some(n) => format!("{n:>7} B"),
        None => format!("{:>9}", "missing"),
    }
}
