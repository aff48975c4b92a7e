//! Hot Reload Message Protocol
//!
//! JSON text frames pushed from the dev server to browser clients.
//!
//! # Message Types
//!
//! - `connected`: handshake acknowledgement
//! - `update`: default incremental update for a changed file
//! - `full-reload`: discard client state and reload (`path` is always `*`)
//! - `error`: build failure overlay, no reload

use serde::{Deserialize, Serialize};

/// Identifier reported as the error's originating plugin.
pub const PLUGIN_NAME: &str = "modkit:hot-update";

/// Error details carried by an `error` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub plugin: String,
}

/// Hot reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HotReloadMessage {
    /// Connection established
    Connected,

    /// Default incremental update (file not claimed by the hot-update hook)
    Update { path: String },

    /// Full page reload
    FullReload { path: String },

    /// Build error (display overlay, no reload)
    Error { err: ErrorPayload },
}

impl HotReloadMessage {
    /// Full reload scoped to all client state.
    pub fn full_reload() -> Self {
        Self::FullReload {
            path: "*".to_string(),
        }
    }

    pub fn update(path: impl Into<String>) -> Self {
        Self::Update { path: path.into() }
    }

    /// Error message attributed to [`PLUGIN_NAME`].
    pub fn error(message: impl Into<String>, stack: Option<String>) -> Self {
        Self::Error {
            err: ErrorPayload {
                message: message.into(),
                stack,
                plugin: PLUGIN_NAME.to_string(),
            },
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub const fn is_full_reload(&self) -> bool {
        matches!(self, Self::FullReload { .. })
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"full-reload","path":"*"}"#.to_string())
    }

    /// Parse from JSON string
    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn as_value(msg: &HotReloadMessage) -> Value {
        serde_json::from_str(&msg.to_json()).unwrap()
    }

    #[test]
    fn test_full_reload_shape() {
        assert_eq!(
            as_value(&HotReloadMessage::full_reload()),
            json!({"type": "full-reload", "path": "*"})
        );
    }

    #[test]
    fn test_error_shape() {
        let msg = HotReloadMessage::error("build command failed", Some("trace".into()));
        assert_eq!(
            as_value(&msg),
            json!({
                "type": "error",
                "err": {"message": "build command failed", "stack": "trace", "plugin": PLUGIN_NAME}
            })
        );
    }

    #[test]
    fn test_error_without_stack() {
        let value = as_value(&HotReloadMessage::error("boom", None));
        assert!(value["err"].get("stack").is_none());

        let parsed = HotReloadMessage::from_json(&value.to_string()).unwrap();
        assert!(parsed.is_error());
    }

    #[test]
    fn test_connected_and_update() {
        assert_eq!(as_value(&HotReloadMessage::Connected), json!({"type": "connected"}));
        assert_eq!(
            as_value(&HotReloadMessage::update("/src/app.tsx")),
            json!({"type": "update", "path": "/src/app.tsx"})
        );
    }
}
