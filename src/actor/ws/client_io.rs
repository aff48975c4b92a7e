use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;

use tungstenite::protocol::Message;

use super::{Clients, WsActor};
use crate::reload::message::HotReloadMessage;

impl WsActor {
    /// Complete the handshake and greet the new client.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during the handshake, non-blocking for the reader loop.
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };

        let mut greeting = vec![HotReloadMessage::Connected];
        greeting.extend(self.pending_error.clone());
        for msg in greeting {
            if let Err(e) = ws.send(Message::Text(msg.to_json().into())) {
                crate::debug!("ws"; "client dropped during greeting: {}", e);
                return;
            }
        }

        let _ = ws.get_ref().set_nonblocking(true);

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }
}

/// Background thread draining client frames and dropping closed sockets.
pub(super) fn client_reader_loop(clients: &Clients) {
    loop {
        std::thread::sleep(Duration::from_millis(100));

        let mut clients = clients.lock();
        let before = clients.len();
        clients.retain_mut(|ws| match ws.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => true,
            Err(_) => false,
        });

        if clients.len() < before {
            crate::debug!("ws"; "client disconnected (total: {})", clients.len());
        }
    }
}
