//! Actor Coordinator - Wires up the Hot Update Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Binds the WebSocket listener
//! - Runs the actors until shutdown

mod runtime;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::hot_update::HotUpdateActor;
use super::messages::{HotUpdateMsg, WsMsg};
use super::ws::WsActor;
use crate::config::cfg;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    ws_port: u16,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(ws_port: u16) -> Self {
        Self {
            ws_port,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let config = cfg();
        let (hot_tx, hot_rx) = mpsc::channel::<HotUpdateMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::unbounded_channel::<WsMsg>();

        let actual_port =
            crate::reload::server::start_ws_server(config.serve.interface, self.ws_port, ws_tx.clone())
                .context("websocket server failed")?;
        crate::cli::serve::set_actual_ws_port(actual_port);
        crate::debug!("ws"; "ws://{}:{}", config.serve.interface, actual_port);

        let fs_actor = FsActor::new(config.get_root(), hot_tx.clone()).context("watcher failed")?;
        let hot_update_actor = HotUpdateActor::new(hot_rx, ws_tx.clone());
        let ws_actor = WsActor::new(ws_rx);

        crate::debug!("actor"; "start");
        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_actors(fs_actor, hot_update_actor, ws_actor, hot_tx, ws_tx, shutdown_rx).await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
