//! Project initialization.
//!
//! Writes `modkit.toml`, a draft module scaffold and the preview directory.
//!
//! # Module Structure
//!
//! - [`validate`]: Pre-initialization validation

mod validate;

use crate::config::BuildConfig;
use crate::embed::init::{CONFIG_TOML, DRAFT_TSX, DraftVars};
use crate::log;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Module name used when the directory name is not a valid one.
const FALLBACK_MODULE_NAME: &str = "newModule";

/// Initialize a project at `root`.
///
/// If `dry_run` is true, only prints the config template to stdout.
pub fn new_project(root: &Path, config_name: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        print!("{CONFIG_TOML}");
        return Ok(());
    }

    let draft = BuildConfig::default().draft;
    let files = [config_name.to_path_buf(), draft.clone()];
    validate::validate_target(root, &files)?;

    write_file(&root.join(config_name), CONFIG_TOML)?;

    let module_name = module_name_for(root);
    let scaffold = DRAFT_TSX.render(&DraftVars {
        module_name: &module_name,
    });
    write_file(&root.join(&draft), &scaffold)?;

    let public = root.join("public");
    fs::create_dir_all(&public)
        .with_context(|| format!("Failed to create directory '{}'", public.display()))?;

    log!("init"; "created {} with module `{}`", draft.display(), module_name);
    log!("init"; "project initialized, run `modkit serve` to start iterating");
    Ok(())
}

/// Project root for `modkit init [name]`.
pub fn resolve_root(cwd: &Path, name: Option<&Path>) -> PathBuf {
    match name {
        Some(name) => cwd.join(name),
        None => cwd.to_path_buf(),
    }
}

/// Module name derived from the project directory.
fn module_name_for(root: &Path) -> String {
    root.file_name()
        .and_then(|n| n.to_str())
        .filter(|name| crate::store::validate_module_name(name).is_ok())
        .filter(|name| !name.contains(['\'', '"', '`']))
        .map_or_else(|| FALLBACK_MODULE_NAME.to_string(), str::to_string)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::extract_module_name;
    use tempfile::TempDir;

    #[test]
    fn test_new_project_writes_scaffold() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("widget");

        new_project(&root, Path::new("modkit.toml"), false).unwrap();

        assert!(root.join("modkit.toml").is_file());
        assert!(root.join("public").is_dir());
        let draft = fs::read_to_string(root.join("src/module/component.tsx")).unwrap();
        assert_eq!(extract_module_name(&draft).as_deref(), Some("widget"));
    }

    #[test]
    fn test_new_project_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("modkit.toml"), "# mine").unwrap();

        assert!(new_project(temp.path(), Path::new("modkit.toml"), false).is_err());
        assert_eq!(
            fs::read_to_string(temp.path().join("modkit.toml")).unwrap(),
            "# mine"
        );
        assert!(!temp.path().join("src/module/component.tsx").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        new_project(temp.path(), Path::new("modkit.toml"), true).unwrap();
        assert!(!temp.path().join("modkit.toml").exists());
    }

    #[test]
    fn test_resolve_root() {
        let cwd = Path::new("/work");
        assert_eq!(resolve_root(cwd, None), PathBuf::from("/work"));
        assert_eq!(
            resolve_root(cwd, Some(Path::new("demo"))),
            PathBuf::from("/work/demo")
        );
    }

    #[test]
    fn test_module_name_fallback() {
        assert_eq!(module_name_for(Path::new("/")), FALLBACK_MODULE_NAME);
        assert_eq!(module_name_for(Path::new("/work/alpha")), "alpha");
    }
}
