//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server resources (client.js, welcome.html)
//! - `init` - Project scaffold (modkit.toml, draft module)
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{CLIENT_JS, ClientVars};
//!
//! let js = CLIENT_JS.render(&ClientVars { ws_port: 24678 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the preview server answers with [`CLIENT_JS`].
    pub const CLIENT_PATH: &str = "/@modkit/client.js";

    /// Variables for client.js.
    pub struct ClientVars {
        pub ws_port: u16,
    }

    impl TemplateVars for ClientVars {
        fn placeholders(&self) -> Vec<(&'static str, String)> {
            vec![("__MODKIT_WS_PORT__", self.ws_port.to_string())]
        }
    }

    /// Browser client for hot update messages.
    pub const CLIENT_JS: Template<ClientVars> = Template::new(include_str!("serve/client.js"));

    /// Variables for welcome.html.
    pub struct WelcomeVars<'a> {
        pub title: &'a str,
        pub root: &'a str,
        pub version: &'a str,
    }

    impl TemplateVars for WelcomeVars<'_> {
        fn placeholders(&self) -> Vec<(&'static str, String)> {
            vec![
                ("__TITLE__", self.title.to_string()),
                ("__ROOT__", self.root.to_string()),
                ("__VERSION__", self.version.to_string()),
            ]
        }
    }

    /// Shown when the preview root has no index.html.
    pub const WELCOME_HTML: Template<WelcomeVars<'static>> =
        Template::new(include_str!("serve/welcome.html"));
}

pub mod init {
    use super::{Template, TemplateVars};

    /// Default `modkit.toml`.
    pub const CONFIG_TOML: &str = include_str!("init/modkit.toml");

    /// Variables for the draft module scaffold.
    pub struct DraftVars<'a> {
        pub module_name: &'a str,
    }

    impl TemplateVars for DraftVars<'_> {
        fn placeholders(&self) -> Vec<(&'static str, String)> {
            vec![("__MODULE_NAME__", self.module_name.to_string())]
        }
    }

    /// Draft module carrying every scaffold comment the normalizer strips.
    pub const DRAFT_TSX: Template<DraftVars<'static>> =
        Template::new(include_str!("init/component.tsx"));
}
