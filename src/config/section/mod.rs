//! Configuration section definitions.
//!
//! Each module corresponds to a section in `modkit.toml`:
//!
//! | Module       | TOML Section     | Purpose                              |
//! |--------------|------------------|--------------------------------------|
//! | `build`      | `[build]`        | Draft, ready artifact, saved dir     |
//! | `hot_update` | `[hot_update]`   | File pattern and build command       |
//! | `serve`      | `[serve]`        | Development server                   |

mod build;
mod hot_update;
mod serve;

pub use build::BuildConfig;
pub use hot_update::HotUpdateConfig;
pub use serve::ServeConfig;

use std::path::{Path, PathBuf};

/// Expand `~` and resolve a relative path against `root`.
pub(crate) fn resolve(root: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if expanded.is_relative() {
        root.join(expanded)
    } else {
        expanded
    }
}
