//! Draft → ready normalization.
//!
//! Turns an author's draft module into the paste-ready artifact the host
//! platform accepts:
//!
//! ```text
//! draft text ──► line rules (clear) ──► collapse blank runs ──► trim ──► + "\n\nComponent"
//! ```
//!
//! This is a line-oriented textual pass. It never parses the module and
//! never fails: text without any recognizable scaffold comes out trimmed
//! with the trailing symbol appended.

mod rules;

use regex::Regex;
use std::sync::LazyLock;

pub use rules::{LineRule, default_rules};

/// Identifier authors assign their module name to.
pub const MODULE_NAME_IDENT: &str = "CustomModuleName";

/// Symbol the host runtime expects as the artifact's final expression.
pub const TRAILING_SYMBOL: &str = "Component";

/// Separator between the module body and the trailing symbol.
const TRAILING_SEPARATOR: &str = "\n\n";

static MODULE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"const\s+{MODULE_NAME_IDENT}\s*=\s*['"`]([^'"`]+)['"`]"#
    ))
    .expect("module name pattern is valid")
});

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank run pattern is valid"));

/// Result of normalizing one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Paste-ready text, always ending in [`TRAILING_SYMBOL`].
    pub ready: String,
    /// Module name declared in the draft, if any.
    pub module_name: Option<String>,
}

/// Rule-driven normalizer.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Vec<LineRule>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules for additional scaffold-comment prefixes.
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.extend(
            prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .map(LineRule::custom),
        );
        self
    }

    #[cfg(test)]
    pub fn rules(&self) -> &[LineRule] {
        &self.rules
    }

    /// Normalize a draft and extract its module name.
    pub fn normalize(&self, draft: &str) -> Normalized {
        Normalized {
            ready: self.ready_text(draft),
            module_name: extract_module_name(draft),
        }
    }

    /// Produce the ready artifact text only.
    pub fn ready_text(&self, draft: &str) -> String {
        let draft = draft.replace("\r\n", "\n");

        let cleared = draft
            .split('\n')
            .map(|line| {
                if self.rules.iter().any(|rule| rule.matches(line)) {
                    ""
                } else {
                    line
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        let collapsed = BLANK_RUN.replace_all(&cleared, TRAILING_SEPARATOR);
        let body = strip_trailing_symbol(collapsed.trim());

        let mut ready = String::with_capacity(body.len() + TRAILING_SYMBOL.len() + 2);
        ready.push_str(body);
        ready.push_str(TRAILING_SEPARATOR);
        ready.push_str(TRAILING_SYMBOL);
        ready
    }
}

/// Extract the module name from the first matching declaration.
///
/// The value is captured verbatim. Returns `None` when no declaration is
/// present; callers skip versioning in that case.
pub fn extract_module_name(text: &str) -> Option<String> {
    MODULE_NAME
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Drop an already-present bare trailing symbol line so it is never doubled.
fn strip_trailing_symbol(body: &str) -> &str {
    if body == TRAILING_SYMBOL {
        return "";
    }
    match body.strip_suffix(TRAILING_SYMBOL) {
        Some(rest) if rest.ends_with('\n') => rest.trim_end(),
        _ => body,
    }
}

// ============================================================================
// Tests
// ============================================================================
