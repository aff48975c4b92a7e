//! Build scheduling strategies.
//!
//! ```text
//! Concurrent:  event ─► spawn build          (overlapping builds allowed)
//! Coalescing:  event ─► single slot ─► build (newer event supersedes current)
//! ```

use tokio::sync::mpsc;

use super::build::{self, BuildJob};

/// Scheduling strategy selected by `hot_update.coalesce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Every event gets its own build; no ordering between notifications.
    Concurrent,
    /// At most one build in flight; later events supersede it.
    Coalescing,
}

impl Strategy {
    pub const fn from_coalesce(coalesce: bool) -> Self {
        if coalesce {
            Self::Coalescing
        } else {
            Self::Concurrent
        }
    }
}

/// Dispatches build jobs according to a [`Strategy`].
pub(super) enum Scheduler {
    Concurrent,
    Coalescing(mpsc::UnboundedSender<BuildJob>),
}

impl Scheduler {
    /// Must be called inside a tokio runtime.
    pub(super) fn new(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Concurrent => Self::Concurrent,
            Strategy::Coalescing => {
                let (tx, rx) = mpsc::unbounded_channel();
                tokio::spawn(coalesce_loop(rx));
                Self::Coalescing(tx)
            }
        }
    }

    pub(super) fn submit(&self, job: BuildJob) {
        match self {
            Self::Concurrent => {
                tokio::spawn(build::run(job));
            }
            Self::Coalescing(tx) => {
                if let Err(mpsc::error::SendError(job)) = tx.send(job) {
                    crate::log!("hot-update"; "build queue closed, running directly");
                    tokio::spawn(build::run(job));
                }
            }
        }
    }
}

/// Single-slot build loop.
///
/// A job arriving while a build runs drops the running build (its child is
/// killed) and becomes the one follow-up run. Jobs queued behind it are
/// folded into the newest one.
async fn coalesce_loop(mut rx: mpsc::UnboundedReceiver<BuildJob>) {
    let mut next: Option<BuildJob> = None;

    loop {
        let job = match next.take() {
            Some(job) => job,
            None => match rx.recv().await {
                Some(job) => job,
                None => break,
            },
        };
        let job = take_latest(job, &mut rx);

        let run = job.cmd().output();
        tokio::pin!(run);

        tokio::select! {
            result = &mut run => job.finish(result),
            incoming = rx.recv() => match incoming {
                Some(newer) => {
                    job.supersede();
                    next = Some(newer);
                }
                None => {
                    let result = run.await;
                    job.finish(result);
                    break;
                }
            },
        }
    }

    crate::debug!("hot-update"; "build queue stopped");
}

/// Fold already-queued jobs into the newest one.
fn take_latest(mut job: BuildJob, rx: &mut mpsc::UnboundedReceiver<BuildJob>) -> BuildJob {
    while let Ok(newer) = rx.try_recv() {
        job.supersede();
        job = newer;
    }
    job
}
