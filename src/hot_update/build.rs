//! Build jobs: run the configured command, relay the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::oneshot;

use super::PushChannel;
use crate::reload::message::HotReloadMessage;
use crate::utils::exec::{Cmd, CmdOutput, ExecError};

/// How a scheduled build ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Command exited 0; a full reload was pushed.
    Succeeded,
    /// Command failed or could not start; an error was pushed.
    Failed,
    /// A newer event replaced this build before it finished; nothing pushed.
    Superseded,
}

/// Completion handle for a scheduled build.
///
/// Dropping it does not cancel the build.
#[derive(Debug)]
pub struct BuildHandle {
    rx: oneshot::Receiver<BuildOutcome>,
}

impl BuildHandle {
    pub(super) fn channel() -> (oneshot::Sender<BuildOutcome>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Wait for the build to finish.
    ///
    /// A build dropped by a shut-down scheduler reports `Superseded`.
    pub async fn wait(self) -> BuildOutcome {
        self.rx.await.unwrap_or(BuildOutcome::Superseded)
    }
}

/// One build request, carrying the session to notify.
pub(super) struct BuildJob {
    pub path: PathBuf,
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub session: Arc<dyn PushChannel>,
    pub done: oneshot::Sender<BuildOutcome>,
}

impl BuildJob {
    pub(super) fn cmd(&self) -> Cmd {
        let cmd = Cmd::shell(&self.command).kill_on_drop(true);
        match &self.cwd {
            Some(dir) => cmd.cwd(dir),
            None => cmd,
        }
    }

    /// Report the outcome to the session and the waiting handle.
    pub(super) fn finish(self, result: Result<CmdOutput, ExecError>) {
        let outcome = relay(&self.command, &self.path, result, self.session.as_ref());
        let _ = self.done.send(outcome);
    }

    pub(super) fn supersede(self) {
        crate::debug!("hot-update"; "superseded build for {}", self.path.display());
        let _ = self.done.send(BuildOutcome::Superseded);
    }
}

/// Run the job's command to completion and relay the result.
pub(super) async fn run(job: BuildJob) {
    let result = job.cmd().output().await;
    job.finish(result);
}

/// Log the command result and push the matching notification.
fn relay(
    command: &str,
    path: &Path,
    result: Result<CmdOutput, ExecError>,
    session: &dyn PushChannel,
) -> BuildOutcome {
    let output = match result {
        Ok(output) if output.success() => output,
        Ok(output) => {
            let reason = format!("`{command}` exited with {}", output.status);
            let detail = output.failure_detail();
            crate::logger::status_error(
                &format!("build command failed: {reason}"),
                detail.as_deref().unwrap_or_default(),
            );
            session.send(HotReloadMessage::error(
                format!("build command failed: {reason}"),
                detail,
            ));
            return BuildOutcome::Failed;
        }
        Err(e) => {
            crate::log!("error"; "build command failed: {}", e);
            session.send(HotReloadMessage::error(
                format!("build command failed: {e}"),
                std::error::Error::source(&e).map(|s| format!("{s:?}")),
            ));
            return BuildOutcome::Failed;
        }
    };

    let stdout = output.stdout.trim_end();
    if !stdout.is_empty() {
        println!("{stdout}");
    }
    let stderr = output.stderr.trim_end();
    if !stderr.is_empty() {
        eprintln!("{stderr}");
    }

    crate::debug!("hot-update"; "command finished, sending full-reload");
    crate::logger::status_success(&format!("rebuilt: {}", path.display()));
    session.send(HotReloadMessage::full_reload());
    BuildOutcome::Succeeded
}
