//! Actor Message Definitions
//!
//! ```text
//! FsActor --Changed/ConfigChanged--> HotUpdateActor --Push--> WsActor
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use crate::reload::message::HotReloadMessage;

/// Messages to HotUpdate Actor
#[derive(Debug)]
pub enum HotUpdateMsg {
    /// Debounced batch of created or modified files
    Changed(Vec<PathBuf>),
    /// The config file changed on disk
    ConfigChanged,
    /// Shutdown
    Shutdown,
}

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Broadcast to every connected client
    Push(HotReloadMessage),
    /// Client accepted by the WebSocket listener, handshake pending
    AddClient(TcpStream),
    /// Shutdown
    Shutdown,
}
