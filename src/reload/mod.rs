//! Reload Module
//!
//! Browser-facing side of hot update.
//!
//! # Modules
//!
//! - `message` - JSON messages pushed to clients
//! - `server` - WebSocket listener handing clients to the actor system

pub mod message;
pub mod server;
