//! Dashboard widgets and the post composer.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::backend::SearchBackend;
use crate::error::ClientError;

pub const WIDGET_ERROR_HTML: &str = "<p>Error loading data.</p>";

/// Server-rendered regions loaded on page start and after a post.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Widget {
    AlumniStories,
    Leaderboard,
    DailySpark,
    Feed,
    TrendingEvents,
}

impl Widget {
    pub const ALL: [Widget; 5] = [
        Widget::AlumniStories,
        Widget::Leaderboard,
        Widget::DailySpark,
        Widget::Feed,
        Widget::TrendingEvents,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            Widget::AlumniStories => "/api/alumni",
            Widget::Leaderboard => "/api/leaderboard",
            Widget::DailySpark => "/api/daily-spark",
            Widget::Feed => "/api/feed",
            Widget::TrendingEvents => "/api/events",
        }
    }

    pub fn region(self) -> &'static str {
        match self {
            Widget::AlumniStories => "alumni-stories",
            Widget::Leaderboard => "leaderboard",
            Widget::DailySpark => "daily-spark",
            Widget::Feed => "feed",
            Widget::TrendingEvents => "trending-events",
        }
    }

    pub fn from_region(region: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|widget| widget.region() == region)
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.region())
    }
}

/// Loads one widget; failures become the error placeholder.
pub async fn load_widget<B: SearchBackend>(backend: &B, widget: Widget) -> String {
    match backend.widget(widget.endpoint()).await {
        Ok(content) => content,
        Err(err) => {
            warn!(widget = %widget, error = %err, "failed to load widget");
            WIDGET_ERROR_HTML.to_string()
        }
    }
}

/// Loads every widget concurrently, returned in [`Widget::ALL`] order.
pub async fn load_all<B: SearchBackend>(backend: Arc<B>) -> Vec<(Widget, String)> {
    let mut tasks = JoinSet::new();
    for widget in Widget::ALL {
        let backend = Arc::clone(&backend);
        tasks.spawn(async move { (widget, load_widget(backend.as_ref(), widget).await) });
    }
    let mut loaded = Vec::with_capacity(Widget::ALL.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(pair) => loaded.push(pair),
            Err(err) => warn!(error = %err, "widget task aborted"),
        }
    }
    loaded.sort_by_key(|(widget, _)| *widget);
    loaded
}

/// Submits the composer text. Blank drafts are still sent; the backend decides.
pub async fn submit_post<B: SearchBackend>(backend: &B, text: &str) -> Result<(), ClientError> {
    backend.submit_post(text).await?;
    info!(chars = text.chars().count(), "post submitted");
    Ok(())
}
