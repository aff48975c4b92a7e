use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::hot_update::HotUpdateActor;
use crate::actor::messages::{HotUpdateMsg, WsMsg};
use crate::actor::ws::WsActor;

/// Run all actors concurrently.
pub(super) async fn run_actors(
    fs: FsActor,
    hot_update: HotUpdateActor,
    ws: WsActor,
    hot_tx: mpsc::Sender<HotUpdateMsg>,
    ws_tx: mpsc::UnboundedSender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let fs_handle = tokio::spawn(async move { fs.run().await });
    let hot_update_handle = tokio::spawn(async move { hot_update.run().await });
    let ws_handle = tokio::spawn(async move { ws.run().await });

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        tokio::select! {
            _ = fs_handle => {}
            _ = ws_handle => {}
        }
    }

    let _ = hot_tx.send(HotUpdateMsg::Shutdown).await;
    let _ = ws_tx.send(WsMsg::Shutdown);

    let _ = tokio::time::timeout(Duration::from_millis(500), hot_update_handle).await;
}
