//! Search and autocomplete client for the alumni portal.
//!
//! Keystrokes are debounced into suggestion requests, committed searches are
//! rendered into the shared dropdown, and a page-wide click rule closes the
//! dropdown when focus moves elsewhere. All page state lives in a headless
//! [`PageView`] owned by a single [`SearchController`].

pub mod backend;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod dismissal;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod highlight;
pub mod history;
pub mod model;
pub mod render;
pub mod theme;
pub mod view;

pub use backend::{HttpBackend, SearchBackend};
pub use config::ClientConfig;
pub use controller::{SearchController, UiEvent, UiHandle};
pub use dashboard::Widget;
pub use dismissal::DismissalController;
pub use error::{ClientError, ThemeError};
pub use fetcher::SuggestionFetcher;
pub use highlight::{Emphasis, Highlighter, highlight, highlight_with};
pub use model::{HistoryEntry, SearchResultItem};
pub use theme::{Theme, ThemeStore};
pub use view::{ClickTarget, EntryAction, ListEntry, ListWidget, PageView, RegionId};
