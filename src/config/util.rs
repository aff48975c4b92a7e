//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
///
/// # Example
/// ```text
/// /home/user/project/src/module/  ← start
/// /home/user/project/modkit.toml  ← found!
/// ```
pub fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src/module");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("modkit.toml"), "").unwrap();

        let found = find_config_file(&nested, Path::new("modkit.toml")).unwrap();
        assert_eq!(found, dir.path().join("modkit.toml"));
    }

    #[test]
    fn test_directory_with_config_name_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("modkit.toml")).unwrap();

        let found = find_config_file(dir.path(), Path::new("modkit.toml"));
        assert_ne!(found, Some(dir.path().join("modkit.toml")));
    }

    #[test]
    fn test_absolute_missing_config() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert_eq!(find_config_file(dir.path(), &missing), None);
    }
}
