//! HotUpdate Actor
//!
//! Feeds watched changes to the [`HotUpdateOrchestrator`]. Changes it does
//! not own fall through to the default `update` notification.
//!
//! ```text
//! Changed([paths]) ──► orchestrator.handle ──► Handled    (build runs, result pushed later)
//!                                         └──► NotHandled ──► Push(update)
//! ConfigChanged ──► reload_config ──► rebuild orchestrator ──► Push(full-reload)
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::{HotUpdateMsg, WsMsg};
use crate::config::{cfg, reload_config};
use crate::hot_update::{
    HotUpdate, HotUpdateOptions, HotUpdateOrchestrator, PushChannel, WatchEvent,
};
use crate::reload::message::HotReloadMessage;

/// Push channel backed by the WebSocket actor.
pub struct WsPush {
    tx: mpsc::UnboundedSender<WsMsg>,
}

impl WsPush {
    pub fn new(tx: mpsc::UnboundedSender<WsMsg>) -> Self {
        Self { tx }
    }
}

impl PushChannel for WsPush {
    fn send(&self, msg: HotReloadMessage) {
        if self.tx.send(WsMsg::Push(msg)).is_err() {
            crate::debug!("ws"; "push dropped, actor stopped");
        }
    }
}

/// HotUpdate Actor - owns the orchestrator for the session
pub struct HotUpdateActor {
    rx: mpsc::Receiver<HotUpdateMsg>,
    session: Arc<dyn PushChannel>,
    orchestrator: HotUpdateOrchestrator,
}

impl HotUpdateActor {
    /// Must be called inside a tokio runtime.
    pub fn new(rx: mpsc::Receiver<HotUpdateMsg>, ws_tx: mpsc::UnboundedSender<WsMsg>) -> Self {
        Self::with_session(rx, Arc::new(WsPush::new(ws_tx)))
    }

    pub fn with_session(rx: mpsc::Receiver<HotUpdateMsg>, session: Arc<dyn PushChannel>) -> Self {
        Self {
            rx,
            session,
            orchestrator: orchestrator_from_config(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                HotUpdateMsg::Changed(paths) => {
                    for path in paths {
                        self.handle_change(&path);
                    }
                }
                HotUpdateMsg::ConfigChanged => self.handle_config_change(),
                HotUpdateMsg::Shutdown => {
                    crate::debug!("hot-update"; "shutting down");
                    break;
                }
            }
        }
    }

    fn handle_change(&self, path: &Path) {
        let event = WatchEvent::new(path, Arc::clone(&self.session));
        match self.orchestrator.handle(event) {
            HotUpdate::Handled { build, .. } => {
                tokio::spawn(async move {
                    let outcome = build.wait().await;
                    crate::debug!("hot-update"; "build finished: {:?}", outcome);
                });
            }
            HotUpdate::NotHandled => {
                let shown = cfg().root_relative(path);
                let shown = shown.to_string_lossy().replace('\\', "/");
                crate::debug!("watch"; "update {}", shown);
                self.session.send(HotReloadMessage::update(shown));
            }
        }
    }

    fn handle_config_change(&mut self) {
        match reload_config() {
            Ok(true) => {
                self.orchestrator = orchestrator_from_config();
                crate::logger::status_success("config reloaded");
                crate::logger::status_detach();
                self.session.send(HotReloadMessage::full_reload());
            }
            Ok(false) => crate::debug!("watch"; "config unchanged"),
            Err(e) => {
                crate::logger::status_warning(&format!("config reload failed, keeping previous: {e:#}"));
                crate::logger::status_detach();
            }
        }
    }
}

fn orchestrator_from_config() -> HotUpdateOrchestrator {
    HotUpdateOrchestrator::new(HotUpdateOptions::from_config(&cfg()))
}
