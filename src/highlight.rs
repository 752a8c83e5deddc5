//! Match highlighting for suggestion labels.

use regex::{Captures, Regex, RegexBuilder};

/// Markup used to wrap each matched span.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Emphasis {
    /// `<b>match</b>`, the form the dropdown renders.
    #[default]
    Html,
    /// `**match**`, for terminal output through a markdown skin.
    Markdown,
}

impl Emphasis {
    fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            Emphasis::Html => ("<b>", "</b>"),
            Emphasis::Markdown => ("**", "**"),
        }
    }
}

/// Wraps every case-insensitive occurrence of `term` in `text` with `<b>` tags.
///
/// An empty term returns the text unchanged. The term is matched literally,
/// so `a.b` only ever matches the three characters `a`, `.`, `b`.
pub fn highlight(text: &str, term: &str) -> String {
    highlight_with(text, term, Emphasis::Html)
}

/// Same as [`highlight`] with a caller-chosen emphasis markup.
pub fn highlight_with(text: &str, term: &str, emphasis: Emphasis) -> String {
    Highlighter::new(term, emphasis).apply(text)
}

/// A compiled search term, reusable across many labels.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
    emphasis: Emphasis,
}

impl Highlighter {
    pub fn new(term: &str, emphasis: Emphasis) -> Self {
        let pattern = if term.is_empty() {
            None
        } else {
            // Only fails for terms that blow the compiled size limit.
            RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
                .ok()
        };
        Self { pattern, emphasis }
    }

    pub fn apply(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return text.to_string();
        };
        let (open, close) = self.emphasis.delimiters();
        pattern
            .replace_all(text, |caps: &Captures<'_>| format!("{open}{}{close}", &caps[0]))
            .into_owned()
    }
}

/// Removes emphasis markup added by [`highlight_with`].
pub fn strip_emphasis(markup: &str, emphasis: Emphasis) -> String {
    let (open, close) = emphasis.delimiters();
    markup.replace(open, "").replace(close, "")
}
