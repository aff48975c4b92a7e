//! Line rules for draft normalization.
//!
//! Each rule is a full-line predicate. A line matched by any rule has its
//! content cleared; the line break stays so that blank-run collapsing decides
//! the final spacing.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

use super::MODULE_NAME_IDENT;

/// Module-name declaration at the start of a line.
static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"^const\s+{MODULE_NAME_IDENT}\s*=\s*['"`][^'"`]+['"`]"#
    ))
    .expect("declaration pattern is valid")
});

/// Scaffold comments shipped with the draft template.
///
/// Naming/versioning instructions, the build-here marker, and the
/// development-only markers.
pub const SCAFFOLD_COMMENTS: &[&str] = &[
    "// Choose a CustomModuleName",
    "// Make sure to change the name",
    "// After confirming the desired name",
    "// Each time you save this script",
    "// @ts-nocheck",
    "// For development",
    "// For Tealstreet:",
    "// Build here",
];

/// How a rule recognizes a line.
#[derive(Debug, Clone)]
pub enum LineMatcher {
    /// Line starts with the given text.
    Prefix(Cow<'static, str>),
    /// Line matches the given (start-anchored) pattern.
    Pattern(&'static LazyLock<Regex>),
}

impl LineMatcher {
    fn matches(&self, line: &str) -> bool {
        match self {
            Self::Prefix(prefix) => line.starts_with(prefix.as_ref()),
            Self::Pattern(re) => re.is_match(line),
        }
    }
}

/// A named line rule.
#[derive(Debug, Clone)]
pub struct LineRule {
    pub label: Cow<'static, str>,
    pub matcher: LineMatcher,
}

impl LineRule {
    pub const fn prefix(label: &'static str, prefix: &'static str) -> Self {
        Self {
            label: Cow::Borrowed(label),
            matcher: LineMatcher::Prefix(Cow::Borrowed(prefix)),
        }
    }

    /// Rule for a user-supplied scaffold marker.
    pub fn custom(prefix: impl Into<String>) -> Self {
        Self {
            label: Cow::Borrowed("custom"),
            matcher: LineMatcher::Prefix(Cow::Owned(prefix.into())),
        }
    }

    #[inline]
    pub fn matches(&self, line: &str) -> bool {
        self.matcher.matches(line)
    }
}

/// Built-in rule set, in evaluation order.
pub fn default_rules() -> Vec<LineRule> {
    let mut rules = vec![
        LineRule::prefix("import", "import"),
        LineRule {
            label: Cow::Borrowed("module-name"),
            matcher: LineMatcher::Pattern(&DECLARATION),
        },
    ];
    rules.extend(
        SCAFFOLD_COMMENTS
            .iter()
            .map(|prefix| LineRule::prefix("scaffold", prefix)),
    );
    rules.push(LineRule::prefix("export", "export default Component"));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match<'a>(rules: &'a [LineRule], line: &str) -> Option<&'a str> {
        rules
            .iter()
            .find(|r| r.matches(line))
            .map(|r| r.label.as_ref())
    }

    #[test]
    fn test_import_rule() {
        let rules = default_rules();
        assert_eq!(first_match(&rules, "import * as React from 'react'"), Some("import"));
        assert_eq!(first_match(&rules, "  import x from 'y'"), None);
    }

    #[test]
    fn test_declaration_rule_quotes() {
        let rules = default_rules();
        for line in [
            "const CustomModuleName = 'alpha'",
            "const CustomModuleName = \"alpha\"",
            "const CustomModuleName = `alpha`",
            "const   CustomModuleName='alpha' // trailing",
        ] {
            assert_eq!(first_match(&rules, line), Some("module-name"), "{line}");
        }
        // Empty value is not a declaration
        assert_eq!(first_match(&rules, "const CustomModuleName = ''"), None);
        assert_eq!(first_match(&rules, "const OtherName = 'alpha'"), None);
    }

    #[test]
    fn test_scaffold_and_export_rules() {
        let rules = default_rules();
        assert_eq!(first_match(&rules, "// Build here ↓"), Some("scaffold"));
        assert_eq!(
            first_match(&rules, "// For development, will be removed in build"),
            Some("scaffold")
        );
        assert_eq!(first_match(&rules, "export default Component"), Some("export"));
        assert_eq!(first_match(&rules, "// a regular comment"), None);
    }

    #[test]
    fn test_custom_rule() {
        let rule = LineRule::custom("// DEV ONLY");
        assert!(rule.matches("// DEV ONLY: mock data"));
        assert!(!rule.matches("const x = 1"));
    }
}
