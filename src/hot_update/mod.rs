//! Hot-update hook for the dev server.
//!
//! For every watch event the orchestrator decides whether the changed file
//! is the one it owns (suffix match against `file_pattern`):
//!
//! ```text
//! WatchEvent ──► matches? ──no──► NotHandled            (host runs its default update)
//!                   │
//!                  yes
//!                   ▼
//!              schedule build ──► Handled { modules: [] } (host suppresses its update)
//!                   │
//!                   ▼  (later, on completion)
//!         exit 0 ─► full-reload      failure ─► error
//! ```
//!
//! The handled signal is returned before the build starts; completion is
//! observable through the returned [`BuildHandle`].

mod build;
mod scheduler;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use build::{BuildHandle, BuildOutcome};
pub use scheduler::Strategy;

use build::BuildJob;
use scheduler::Scheduler;

use crate::config::ProjectConfig;
use crate::reload::message::HotReloadMessage;

/// Live connection to browser clients of one dev-server session.
pub trait PushChannel: Send + Sync + 'static {
    fn send(&self, msg: HotReloadMessage);
}

/// A single changed file plus the session that observed it.
#[derive(Clone)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub session: Arc<dyn PushChannel>,
}

impl WatchEvent {
    pub fn new(path: impl Into<PathBuf>, session: Arc<dyn PushChannel>) -> Self {
        Self {
            path: path.into(),
            session,
        }
    }
}

/// Result returned to the host for one event.
#[derive(Debug)]
pub enum HotUpdate {
    /// Path not owned by this hook; default handling proceeds.
    NotHandled,
    /// Path owned by this hook. `modules` is always empty so the host skips
    /// its own incremental update.
    Handled {
        modules: Vec<PathBuf>,
        build: BuildHandle,
    },
}

#[cfg(test)]
impl HotUpdate {
    pub const fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct HotUpdateOptions {
    /// Suffix matched against changed paths.
    pub file_pattern: String,
    /// Shell command line run on a match.
    pub command: String,
    /// Working directory for the command (process cwd when `None`).
    pub cwd: Option<PathBuf>,
    pub strategy: Strategy,
}

impl HotUpdateOptions {
    pub fn new(file_pattern: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            file_pattern: file_pattern.into(),
            command: command.into(),
            cwd: None,
            strategy: Strategy::Concurrent,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Settings from the `[hot_update]` section, run from the project root.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let section = &config.hot_update;
        Self::new(&section.file_pattern, &section.command)
            .with_strategy(Strategy::from_coalesce(section.coalesce))
            .with_cwd(config.get_root())
    }
}

/// Matches watch events and drives external builds.
pub struct HotUpdateOrchestrator {
    options: HotUpdateOptions,
    pattern: String,
    scheduler: Scheduler,
}

impl HotUpdateOrchestrator {
    /// Must be called inside a tokio runtime.
    pub fn new(options: HotUpdateOptions) -> Self {
        let pattern = slashed(&options.file_pattern);
        let scheduler = Scheduler::new(options.strategy);
        Self {
            options,
            pattern,
            scheduler,
        }
    }

    /// Suffix match on the `/`-separated form of `path`.
    pub fn matches(&self, path: &Path) -> bool {
        !self.pattern.is_empty() && slashed(&path.to_string_lossy()).ends_with(&self.pattern)
    }

    /// Handle one watch event without waiting for the build.
    pub fn handle(&self, event: WatchEvent) -> HotUpdate {
        if !self.matches(&event.path) {
            return HotUpdate::NotHandled;
        }

        crate::log!("hot-update"; "file changed: {}", event.path.display());
        crate::log!("hot-update"; "executing command: {}", self.options.command);

        let (done, build) = BuildHandle::channel();
        self.scheduler.submit(BuildJob {
            path: event.path,
            command: self.options.command.clone(),
            cwd: self.options.cwd.clone(),
            session: event.session,
            done,
        });

        HotUpdate::Handled {
            modules: Vec::new(),
            build,
        }
    }
}

fn slashed(s: &str) -> String {
    s.replace('\\', "/")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<HotReloadMessage>>);

    impl PushChannel for Recorder {
        fn send(&self, msg: HotReloadMessage) {
            self.0.lock().push(msg);
        }
    }

    impl Recorder {
        fn counts(&self) -> (usize, usize) {
            let messages = self.0.lock();
            let reloads = messages.iter().filter(|m| m.is_full_reload()).count();
            let errors = messages.iter().filter(|m| m.is_error()).count();
            (reloads, errors)
        }
    }

    const PATTERN: &str = "src/module/component.tsx";
    const CHANGED: &str = "/home/dev/project/src/module/component.tsx";

    fn orchestrator(command: &str, strategy: Strategy) -> HotUpdateOrchestrator {
        HotUpdateOrchestrator::new(HotUpdateOptions::new(PATTERN, command).with_strategy(strategy))
    }

    fn event(path: &str, recorder: &Arc<Recorder>) -> WatchEvent {
        WatchEvent::new(path, Arc::clone(recorder) as Arc<dyn PushChannel>)
    }

    async fn handle_and_wait(
        orch: &HotUpdateOrchestrator,
        path: &str,
        recorder: &Arc<Recorder>,
    ) -> Option<BuildOutcome> {
        match orch.handle(event(path, recorder)) {
            HotUpdate::Handled { modules, build } => {
                assert!(modules.is_empty());
                Some(build.wait().await)
            }
            HotUpdate::NotHandled => None,
        }
    }

    #[tokio::test]
    async fn test_suffix_matching() {
        let orch = orchestrator("true", Strategy::Concurrent);
        assert!(orch.matches(Path::new(CHANGED)));
        assert!(orch.matches(Path::new("src/module/component.tsx")));
        assert!(!orch.matches(Path::new("/p/src/module/component-ready.tsx")));
        assert!(!orch.matches(Path::new("/p/src/module/component.tsx.bak")));
    }

    #[tokio::test]
    async fn test_windows_separators_match() {
        let orch = orchestrator("true", Strategy::Concurrent);
        assert!(orch.matches(Path::new(r"C:\dev\src\module\component.tsx")));
    }

    #[tokio::test]
    async fn test_empty_pattern_never_matches() {
        let orch = HotUpdateOrchestrator::new(HotUpdateOptions::new("", "true"));
        assert!(!orch.matches(Path::new(CHANGED)));
    }

    #[tokio::test]
    async fn test_unmatched_path_not_handled() {
        let recorder = Arc::new(Recorder::default());
        let orch = orchestrator("exit 0", Strategy::Concurrent);

        let result = orch.handle(event("/p/src/other.tsx", &recorder));
        assert!(!result.is_handled());
        assert_eq!(recorder.counts(), (0, 0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_sends_one_full_reload() {
        let recorder = Arc::new(Recorder::default());
        let orch = orchestrator("exit 0", Strategy::Concurrent);

        let outcome = handle_and_wait(&orch, CHANGED, &recorder).await;
        assert_eq!(outcome, Some(BuildOutcome::Succeeded));
        assert_eq!(recorder.counts(), (1, 0));
        assert_eq!(recorder.0.lock()[0], HotReloadMessage::full_reload());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_sends_one_error() {
        let recorder = Arc::new(Recorder::default());
        let orch = orchestrator("echo 'syntax error' 1>&2; exit 1", Strategy::Concurrent);

        let outcome = handle_and_wait(&orch, CHANGED, &recorder).await;
        assert_eq!(outcome, Some(BuildOutcome::Failed));
        assert_eq!(recorder.counts(), (0, 1));

        let messages = recorder.0.lock();
        let HotReloadMessage::Error { err } = &messages[0] else {
            panic!("expected error message");
        };
        assert!(!err.message.is_empty());
        assert_eq!(err.stack.as_deref(), Some("syntax error"));
        assert_eq!(err.plugin, crate::reload::message::PLUGIN_NAME);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_with_stderr_still_reloads() {
        let recorder = Arc::new(Recorder::default());
        let orch = orchestrator("echo warning 1>&2", Strategy::Concurrent);

        let outcome = handle_and_wait(&orch, CHANGED, &recorder).await;
        assert_eq!(outcome, Some(BuildOutcome::Succeeded));
        assert_eq!(recorder.counts(), (1, 0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_handle_returns_before_build_finishes() {
        let recorder = Arc::new(Recorder::default());
        let orch = orchestrator("sleep 1", Strategy::Concurrent);

        let start = std::time::Instant::now();
        let result = orch.handle(event(CHANGED, &recorder));
        assert!(start.elapsed() < std::time::Duration::from_millis(500));
        assert!(result.is_handled());
        assert_eq!(recorder.counts(), (0, 0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_concurrent_builds_each_notify() {
        let recorder = Arc::new(Recorder::default());
        let orch = orchestrator("sleep 0.2", Strategy::Concurrent);

        let first = orch.handle(event(CHANGED, &recorder));
        let second = orch.handle(event(CHANGED, &recorder));
        for result in [first, second] {
            let HotUpdate::Handled { build, .. } = result else {
                panic!("expected handled");
            };
            assert_eq!(build.wait().await, BuildOutcome::Succeeded);
        }
        assert_eq!(recorder.counts(), (2, 0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_coalescing_supersedes_running_build() {
        let recorder = Arc::new(Recorder::default());
        let orch = orchestrator("sleep 0.5", Strategy::Coalescing);

        let HotUpdate::Handled { build: first, .. } = orch.handle(event(CHANGED, &recorder)) else {
            panic!("expected handled");
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let HotUpdate::Handled { build: second, .. } = orch.handle(event(CHANGED, &recorder)) else {
            panic!("expected handled");
        };

        assert_eq!(first.wait().await, BuildOutcome::Superseded);
        assert_eq!(second.wait().await, BuildOutcome::Succeeded);
        assert_eq!(recorder.counts(), (1, 0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_coalescing_folds_queued_events() {
        let recorder = Arc::new(Recorder::default());
        let orch = orchestrator("sleep 0.3", Strategy::Coalescing);

        let handles: Vec<_> = (0..4)
            .map(|_| match orch.handle(event(CHANGED, &recorder)) {
                HotUpdate::Handled { build, .. } => build,
                HotUpdate::NotHandled => panic!("expected handled"),
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.wait().await);
        }

        let succeeded = outcomes.iter().filter(|o| **o == BuildOutcome::Succeeded).count();
        assert_eq!(succeeded, 1);
        assert_eq!(outcomes.last(), Some(&BuildOutcome::Succeeded));
        assert_eq!(recorder.counts(), (1, 0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_coalescing_sequential_events_both_run() {
        let recorder = Arc::new(Recorder::default());
        let orch = orchestrator("exit 0", Strategy::Coalescing);

        assert_eq!(
            handle_and_wait(&orch, CHANGED, &recorder).await,
            Some(BuildOutcome::Succeeded)
        );
        assert_eq!(
            handle_and_wait(&orch, CHANGED, &recorder).await,
            Some(BuildOutcome::Succeeded)
        );
        assert_eq!(recorder.counts(), (2, 0));
    }

    #[test]
    fn test_strategy_from_coalesce() {
        assert_eq!(Strategy::from_coalesce(true), Strategy::Coalescing);
        assert_eq!(Strategy::from_coalesce(false), Strategy::Concurrent);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_failure_sends_one_error() {
        let recorder = Arc::new(Recorder::default());
        let options = HotUpdateOptions::new(PATTERN, "exit 0").with_cwd("/nonexistent/modkit-project");
        let orch = HotUpdateOrchestrator::new(options);

        let outcome = handle_and_wait(&orch, CHANGED, &recorder).await;
        assert_eq!(outcome, Some(BuildOutcome::Failed));
        assert_eq!(recorder.counts(), (0, 1));
        match &recorder.0.lock()[0] {
            HotReloadMessage::Error { err } => {
                assert!(err.message.starts_with("build command failed"), "{}", err.message);
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_command_sends_one_error() {
        let recorder = Arc::new(Recorder::default());
        let orch = orchestrator("   ", Strategy::Coalescing);

        let outcome = handle_and_wait(&orch, CHANGED, &recorder).await;
        assert_eq!(outcome, Some(BuildOutcome::Failed));
        assert_eq!(recorder.counts(), (0, 1));
    }
}
