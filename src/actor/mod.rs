//! Actor System for Hot Update
//!
//! Message-passing concurrency for `modkit serve`:
//!
//! ```text
//! FsActor --> HotUpdateActor --> WsActor
//! (watch)     (match + build)   (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `hot_update` - Routes changes through the hot update orchestrator
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod hot_update;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
