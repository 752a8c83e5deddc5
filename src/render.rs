//! Suggestion dropdown rendering.

use crate::highlight::{Emphasis, Highlighter};
use crate::view::{ListEntry, PageView};

/// Replaces the dropdown with `suggestions`.
///
/// Each label is highlighted against the input as it reads *now*, which can be
/// newer than the text the suggestions were fetched for. An empty list hides
/// the dropdown instead of showing a placeholder.
pub fn render_suggestions(view: &mut PageView, suggestions: &[String], execute_on_select: bool) {
    view.suggestions.clear();
    if suggestions.is_empty() {
        view.suggestions.hide();
        return;
    }
    let highlighter = Highlighter::new(&view.input, Emphasis::Html);
    for suggestion in suggestions {
        let entry = ListEntry::plain(suggestion.as_str())
            .with_markup(highlighter.apply(suggestion))
            .selectable(execute_on_select);
        view.suggestions.push(entry);
    }
    view.suggestions.show();
}
