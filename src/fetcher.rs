//! Debounced suggestion fetching.

use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Sleep, sleep};
use tracing::{debug, warn};

use crate::backend::SearchBackend;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Holds at most one scheduled suggestion fetch.
///
/// Every [`on_input`](Self::on_input) drops the previous timer before arming a
/// new one, so a burst of keystrokes inside the quiet period produces a single
/// fetch for the last text typed.
#[derive(Debug)]
pub struct SuggestionFetcher {
    quiet_period: Duration,
    pending: Option<PendingFetch>,
}

#[derive(Debug)]
struct PendingFetch {
    query: String,
    timer: Pin<Box<Sleep>>,
}

impl SuggestionFetcher {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Reschedules the fetch for `query`, cancelling any pending one.
    pub fn on_input(&mut self, query: impl Into<String>) {
        let query = query.into();
        if let Some(previous) = self.pending.take() {
            debug!(query = %previous.query, "cancelled pending suggestion fetch");
        }
        debug!(%query, delay_ms = self.quiet_period.as_millis() as u64, "scheduled suggestion fetch");
        self.pending = Some(PendingFetch {
            query,
            timer: Box::pin(sleep(self.quiet_period)),
        });
    }

    /// Drops the pending fetch. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_query(&self) -> Option<&str> {
        self.pending.as_ref().map(|pending| pending.query.as_str())
    }

    /// Resolves with the captured query once the pending timer elapses.
    ///
    /// Never resolves while nothing is pending. Cancel safe: the pending entry
    /// is only consumed after the timer has completed.
    pub async fn fired(&mut self) -> String {
        let Some(pending) = self.pending.as_mut() else {
            return future::pending().await;
        };
        pending.timer.as_mut().await;
        self.pending
            .take()
            .map(|pending| pending.query)
            .unwrap_or_default()
    }
}

impl Default for SuggestionFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

/// Asks the backend for suggestions; any failure becomes an empty list.
pub async fn fetch_suggestions<B: SearchBackend>(backend: &B, query: &str) -> Vec<String> {
    match backend.suggestions(query).await {
        Ok(suggestions) => {
            debug!(%query, count = suggestions.len(), "suggestions received");
            suggestions
        }
        Err(err) => {
            warn!(%query, error = %err, decode = err.is_decode(), "suggestion fetch failed");
            Vec::new()
        }
    }
}
