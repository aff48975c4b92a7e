//! Placeholder templates with typed variables.

use std::marker::PhantomData;

/// Variables substituted into a [`Template`].
pub trait TemplateVars {
    /// `(placeholder, value)` pairs, applied in order.
    fn placeholders(&self) -> Vec<(&'static str, String)>;
}

/// Static text with `__PLACEHOLDER__` markers filled from `V`.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }

    pub const fn content(&self) -> &'static str {
        self.content
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.placeholders()
            .into_iter()
            .fold(self.content.to_string(), |text, (key, value)| {
                text.replace(key, &value)
            })
    }
}
