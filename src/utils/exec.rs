//! External command execution.
//!
//! Build commands are configured as a single shell command line, so they are
//! run through the platform shell (`sh -c` / `cmd /C`) on the tokio runtime.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::shell("modkit build")
//!     .cwd(root)
//!     .kill_on_drop(true)
//!     .output()
//!     .await?;
//!
//! if !output.success() {
//!     eprintln!("{}", output.failure_detail().unwrap_or_default());
//! }
//! ```

use regex::Regex;
use std::{
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    sync::LazyLock,
};
use thiserror::Error;

/// Errors raised before a command produced an exit status.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("command line is empty")]
    Empty,

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Builder API
// ============================================================================

/// Shell command builder.
#[derive(Debug, Default, Clone)]
pub struct Cmd {
    line: String,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    kill_on_drop: bool,
}

impl Cmd {
    /// Create a builder for a shell command line.
    pub fn shell(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            ..Default::default()
        }
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    #[cfg(test)]
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    /// Kill the child process when the pending `output()` future is dropped.
    pub fn kill_on_drop(mut self, enable: bool) -> Self {
        self.kill_on_drop = enable;
        self
    }

    /// The command line as configured.
    #[cfg(test)]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Run to completion, capturing stdout and stderr.
    ///
    /// A non-zero exit is not an error here; inspect [`CmdOutput::success`].
    pub async fn output(self) -> Result<CmdOutput, ExecError> {
        if self.line.trim().is_empty() {
            return Err(ExecError::Empty);
        }

        let output = self
            .command()
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                command: self.line.clone(),
                source,
            })?;

        Ok(CmdOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn command(&self) -> tokio::process::Command {
        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = tokio::process::Command::new("cmd");
            cmd.arg("/C").arg(&self.line);
            cmd
        };
        #[cfg(not(windows))]
        let mut cmd = {
            let mut cmd = tokio::process::Command::new("sh");
            cmd.arg("-c").arg(&self.line);
            cmd
        };

        cmd.envs(self.envs.iter().cloned())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(self.kill_on_drop);

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

// ============================================================================
// Output
// ============================================================================

/// Exit status plus captured output of a finished command.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Captured output suitable for an error report: stderr first, then
    /// stdout, ANSI codes removed. `None` if the command printed nothing.
    pub fn failure_detail(&self) -> Option<String> {
        let stderr = strip_ansi(self.stderr.trim());
        let stdout = strip_ansi(self.stdout.trim());

        let detail = match (stderr.is_empty(), stdout.is_empty()) {
            (true, true) => return None,
            (false, true) => stderr.into_owned(),
            (true, false) => stdout.into_owned(),
            (false, false) => format!("{stderr}\n\nStdout:\n{stdout}"),
        };
        Some(detail)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("ansi pattern is valid"));
    RE.replace_all(s, "")
}

// ============================================================================
// Tests
// ============================================================================
