//! FileSystem Actor
//!
//! Watches the project root and sends debounced changes to the
//! HotUpdateActor. The watcher starts before the request loop, so no
//! edit made while the server starts up is lost.
//!
//! ```text
//! Watcher → Debouncer (pure timing) → WatchFilter (config-aware) → HotUpdateMsg
//! ```

use std::path::Path;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::HotUpdateMsg;
use crate::config::cfg;

// Pure timing and deduplication.
mod debouncer;
// Ignore rules and routing.
mod filter;
// Shared fs event types.
mod types;

#[cfg(test)]
mod tests;

use debouncer::Debouncer;
use filter::WatchFilter;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    /// Channel to send messages to HotUpdateActor
    hot_tx: mpsc::Sender<HotUpdateMsg>,
    debouncer: Debouncer,
}

impl FsActor {
    /// Start watching `root` recursively.
    pub fn new(root: &Path, hot_tx: mpsc::Sender<HotUpdateMsg>) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        crate::debug!("watch"; "watching {}", root.display());

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            hot_tx,
            debouncer: Debouncer::new(),
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            _watcher,
            hot_tx,
            mut debouncer,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    if process_changes(&mut debouncer, &hot_tx).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Process debounced file changes
///
/// Returns `Err(())` if HotUpdateActor shut down
async fn process_changes(
    debouncer: &mut Debouncer,
    hot_tx: &mpsc::Sender<HotUpdateMsg>,
) -> Result<(), ()> {
    // Events stay buffered until the server is accepting requests.
    if !crate::core::is_serving() {
        return Ok(());
    }

    let Some(changes) = debouncer.take_if_ready() else {
        return Ok(());
    };

    let filter = WatchFilter::from_config(&cfg());
    for msg in filter.route(changes) {
        hot_tx.send(msg).await.map_err(|_| ())?;
    }

    Ok(())
}
