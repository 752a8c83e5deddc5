//! Committed searches and result rendering.

use tracing::{debug, warn};

use crate::backend::SearchBackend;
use crate::error::ClientError;
use crate::model::SearchResultItem;
use crate::view::{ListEntry, PageView};

pub const NO_RESULTS_TEXT: &str = "No results found.";
pub const NO_RESULTS_CLASS: &str = "no-results";
pub const SEARCH_FAILED_ALERT: &str = "Search failed.";

/// Sends the committed query to the backend.
pub async fn run_search<B: SearchBackend>(
    backend: &B,
    query: &str,
) -> Result<Vec<SearchResultItem>, ClientError> {
    debug!(%query, "search issued");
    backend.search(query).await
}

/// Applies a finished search to the page.
///
/// Failures raise the "Search failed." alert and leave the dropdown alone.
pub fn apply_search_outcome(
    view: &mut PageView,
    query: &str,
    outcome: Result<Vec<SearchResultItem>, ClientError>,
) {
    match outcome {
        Ok(results) => {
            debug!(%query, count = results.len(), "search results received");
            render_results(view, &results);
        }
        Err(err) => {
            warn!(%query, error = %err, "search failed");
            view.alert(SEARCH_FAILED_ALERT);
        }
    }
}

/// Writes results into the shared dropdown; an empty set gets a marker row.
pub fn render_results(view: &mut PageView, results: &[SearchResultItem]) {
    view.suggestions.clear();
    view.suggestions.hide();
    if results.is_empty() {
        view.suggestions
            .push(ListEntry::plain(NO_RESULTS_TEXT).with_class(NO_RESULTS_CLASS));
    } else {
        for result in results {
            view.suggestions
                .push(ListEntry::plain(result.display_text()).selectable(false));
        }
    }
    view.suggestions.show();
}
