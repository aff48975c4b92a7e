use tungstenite::protocol::Message;

use super::Clients;
use crate::reload::message::HotReloadMessage;

/// Broadcast a message to all connected clients, dropping dead ones.
pub(super) fn broadcast(clients: &Clients, msg: &HotReloadMessage) {
    let mut clients = clients.lock();
    if clients.is_empty() {
        crate::debug!("ws"; "no clients connected");
        return;
    }

    let frame = Message::Text(msg.to_json().into());
    clients.retain_mut(|ws| match ws.send(frame.clone()) {
        Ok(()) => true,
        Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
            // Frame is buffered; the next write flushes it.
            true
        }
        Err(e) => {
            crate::debug!("ws"; "client disconnected: {}", e);
            false
        }
    });
    crate::debug!("ws"; "broadcast to {} clients", clients.len());
}
