//! `[serve]` section configuration.
//!
//! Contains development server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5173                 # HTTP port number
//! ws_port = 24678             # WebSocket port for push messages
//! root = "public"             # Preview directory served over HTTP
//! watch = true                # Run hot update on file changes
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// WebSocket port. `0` picks `port + 1`.
    pub ws_port: u16,

    /// Directory served by the preview server.
    pub root: PathBuf,

    /// Enable file watcher for hot update.
    pub watch: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5173,
            ws_port: 24678,
            root: PathBuf::from("public"),
            watch: true,
        }
    }
}

impl ServeConfig {
    pub const WS_PORT: FieldPath = FieldPath::new("serve.ws_port");

    /// Effective WebSocket port.
    pub const fn ws_port(&self) -> u16 {
        if self.ws_port == 0 {
            self.port.saturating_add(1)
        } else {
            self.ws_port
        }
    }

    pub(crate) fn normalize(&mut self, root: &Path) {
        self.root = super::resolve(root, &self.root);
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port != 0 && self.ws_port() == self.port {
            diag.error_with_hint(
                Self::WS_PORT,
                format!("WebSocket port {} collides with the HTTP port", self.port),
                "choose a different `serve.ws_port`, or 0 for port + 1",
            );
        }
    }
}
