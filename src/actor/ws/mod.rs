//! WebSocket Actor
//!
//! Owns the connected browser clients and broadcasts hot update messages.
//! The last `error` is kept and replayed to clients that connect later;
//! a `full-reload` clears it.
//!
//! ```text
//! HotUpdateActor --[Push]--> WsActor --[broadcast]--> Clients
//! WS listener ---[AddClient]--^
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::reload::message::HotReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::UnboundedReceiver<WsMsg>,
    /// Connected clients (shared for broadcast + read thread)
    clients: Clients,
    /// Last build error, sent to clients that connect after it
    pending_error: Option<HotReloadMessage>,
}

impl WsActor {
    pub fn new(rx: mpsc::UnboundedReceiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: None,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || client_io::client_reader_loop(&clients_for_reader));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Push(msg) => self.push(msg),
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    let mut clients = self.clients.lock();
                    for mut ws in clients.drain(..) {
                        let _ = ws.close(None);
                    }
                    break;
                }
            }
        }
    }

    fn push(&mut self, msg: HotReloadMessage) {
        match &msg {
            HotReloadMessage::Error { .. } => self.pending_error = Some(msg.clone()),
            HotReloadMessage::FullReload { .. } => self.pending_error = None,
            _ => {}
        }
        delivery::broadcast(&self.clients, &msg);
    }
}
