//! Search history panel.

use tracing::{debug, warn};

use crate::backend::SearchBackend;
use crate::error::ClientError;
use crate::model::HistoryEntry;
use crate::view::{ListEntry, PageView};

/// Flips the panel. Returns `true` when it just became visible and the
/// history should be (re)loaded.
pub fn toggle(view: &mut PageView) -> bool {
    if view.history.is_visible() {
        view.history.hide();
        false
    } else {
        view.history.show();
        true
    }
}

pub async fn load_history<B: SearchBackend>(
    backend: &B,
) -> Result<Vec<HistoryEntry>, ClientError> {
    backend.history().await
}

/// Replaces the panel contents on success; on failure the last good contents stay.
pub fn apply_history(view: &mut PageView, outcome: Result<Vec<HistoryEntry>, ClientError>) {
    match outcome {
        Ok(entries) => {
            debug!(count = entries.len(), "search history loaded");
            view.history.clear();
            for entry in &entries {
                view.history.push(ListEntry::plain(entry.text()));
            }
        }
        Err(err) => warn!(error = %err, "failed to load search history"),
    }
}
