//! Headless page model: every region the search layer reads or writes.

use std::collections::BTreeMap;
use std::fmt;

use crate::dashboard::Widget;

/// Stable identifiers of the regions the core expects at startup.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum RegionId {
    SearchInput,
    SuggestionsList,
    SearchHistory,
    Widget(Widget),
}

impl RegionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionId::SearchInput => "search-input",
            RegionId::SuggestionsList => "suggestions-list",
            RegionId::SearchHistory => "search-history",
            RegionId::Widget(widget) => widget.region(),
        }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens when a list entry is clicked.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EntryAction {
    /// Plain text row.
    None,
    /// Copy `text` into the search input and close the dropdown, optionally
    /// committing a search for it right away.
    Select { text: String, execute: bool },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ListEntry {
    /// Plain display text.
    pub text: String,
    /// Text with emphasis markup, equal to `text` when nothing is highlighted.
    pub markup: String,
    pub class: Option<&'static str>,
    pub action: EntryAction,
}

impl ListEntry {
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            markup: text.clone(),
            text,
            class: None,
            action: EntryAction::None,
        }
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    pub fn with_class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    pub fn selectable(mut self, execute: bool) -> Self {
        self.action = EntryAction::Select {
            text: self.text.clone(),
            execute,
        };
        self
    }
}

/// A `<ul>`-like region: ordered entries plus a display flag.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ListWidget {
    entries: Vec<ListEntry>,
    visible: bool,
}

impl ListWidget {
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&ListEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn push(&mut self, entry: ListEntry) {
        self.entries.push(entry);
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.text.as_str()).collect()
    }
}

/// Element a click landed on.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ClickTarget {
    SearchInput,
    /// The dropdown container itself, outside any entry.
    SuggestionsList,
    SuggestionEntry(usize),
    HistoryPanel,
    HistoryEntry(usize),
    Widget(Widget),
    /// Anything else on the page.
    Elsewhere,
}

impl ClickTarget {
    /// Whether the target is the region or one of its descendants.
    pub fn is_within(&self, region: RegionId) -> bool {
        match (self, region) {
            (ClickTarget::SearchInput, RegionId::SearchInput) => true,
            (
                ClickTarget::SuggestionsList | ClickTarget::SuggestionEntry(_),
                RegionId::SuggestionsList,
            ) => true,
            (
                ClickTarget::HistoryPanel | ClickTarget::HistoryEntry(_),
                RegionId::SearchHistory,
            ) => true,
            (ClickTarget::Widget(widget), RegionId::Widget(other)) => *widget == other,
            _ => false,
        }
    }
}

/// All page state the interaction layer owns.
#[derive(Debug, Clone, Default)]
pub struct PageView {
    /// Current contents of the search input.
    pub input: String,
    /// Suggestions dropdown, also used for committed search results.
    pub suggestions: ListWidget,
    pub history: ListWidget,
    /// Dashboard widget regions, holding server-provided HTML.
    pub widgets: BTreeMap<Widget, String>,
    /// Text of the post composer.
    pub post_draft: String,
    alerts: Vec<String>,
}

impl PageView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises a blocking user-facing message.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn widget(&self, widget: Widget) -> Option<&str> {
        self.widgets.get(&widget).map(String::as_str)
    }
}
