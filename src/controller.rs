//! Single-owner event loop for the search page.
//!
//! The controller owns the [`PageView`] and every piece of interaction state.
//! UI events arrive over an mpsc channel and are handled strictly in order;
//! backend calls run as separate tasks and report back as completions, so a
//! slow request never blocks further keystrokes. Alerts are drained from the
//! page as they are raised and forwarded to alert subscribers.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::backend::SearchBackend;
use crate::config::ClientConfig;
use crate::dashboard::{self, Widget};
use crate::dismissal::DismissalController;
use crate::error::ClientError;
use crate::executor;
use crate::fetcher::{self, SuggestionFetcher};
use crate::history;
use crate::model::{HistoryEntry, SearchResultItem};
use crate::render::render_suggestions;
use crate::view::{ClickTarget, EntryAction, PageView};

const ALERT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum UiEvent {
    /// The search input now reads this text.
    Input(String),
    /// Enter pressed in the search input.
    Enter,
    Click(ClickTarget),
    ToggleHistory,
    LoadDashboard,
    EditPost(String),
    SubmitPost,
    Shutdown,
}

enum Completion {
    Suggestions {
        query: String,
        suggestions: Vec<String>,
    },
    Search {
        query: String,
        outcome: Result<Vec<SearchResultItem>, ClientError>,
    },
    History(Result<Vec<HistoryEntry>, ClientError>),
    Widget(Widget, String),
    Posted(Result<(), ClientError>),
}

/// Sending side of the controller's event queue.
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl UiHandle {
    /// Returns `false` once the controller has stopped.
    pub fn send(&self, event: UiEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn input(&self, text: impl Into<String>) -> bool {
        self.send(UiEvent::Input(text.into()))
    }

    pub fn enter(&self) -> bool {
        self.send(UiEvent::Enter)
    }

    pub fn click(&self, target: ClickTarget) -> bool {
        self.send(UiEvent::Click(target))
    }

    pub fn shutdown(&self) -> bool {
        self.send(UiEvent::Shutdown)
    }
}

pub struct SearchController<B> {
    backend: Arc<B>,
    search_on_select: bool,
    view: PageView,
    fetcher: SuggestionFetcher,
    dismissal: DismissalController,
    events: mpsc::UnboundedReceiver<UiEvent>,
    tasks: JoinSet<Completion>,
    snapshots: watch::Sender<PageView>,
    alerts: broadcast::Sender<String>,
}

impl<B: SearchBackend> SearchController<B> {
    pub fn new(backend: B, config: &ClientConfig) -> (Self, UiHandle) {
        let (tx, events) = mpsc::unbounded_channel();
        let (snapshots, _) = watch::channel(PageView::default());
        let (alerts, _) = broadcast::channel(ALERT_CAPACITY);
        let controller = Self {
            backend: Arc::new(backend),
            search_on_select: config.search_on_select,
            view: PageView::default(),
            fetcher: SuggestionFetcher::new(config.quiet_period),
            dismissal: DismissalController::standard(),
            events,
            tasks: JoinSet::new(),
            snapshots,
            alerts,
        };
        (controller, UiHandle { tx })
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn fetcher(&self) -> &SuggestionFetcher {
        &self.fetcher
    }

    /// Backend calls started but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Receives a copy of the page after every change.
    pub fn subscribe(&self) -> watch::Receiver<PageView> {
        self.snapshots.subscribe()
    }

    /// Receives every alert raised after subscribing. Snapshots never carry alerts.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<String> {
        self.alerts.subscribe()
    }

    /// Handles one UI event. Returns `false` on shutdown.
    pub fn dispatch(&mut self, event: UiEvent) -> bool {
        debug!(?event, "ui event");
        match event {
            UiEvent::Input(text) => {
                self.view.input.clone_from(&text);
                self.fetcher.on_input(text);
            }
            UiEvent::Enter => {
                let query = self.view.input.clone();
                self.spawn_search(query);
            }
            UiEvent::Click(target) => self.click(target),
            UiEvent::ToggleHistory => {
                if history::toggle(&mut self.view) {
                    let backend = Arc::clone(&self.backend);
                    self.spawn(async move {
                        Completion::History(history::load_history(backend.as_ref()).await)
                    });
                }
            }
            UiEvent::LoadDashboard => self.spawn_dashboard(),
            UiEvent::EditPost(text) => self.view.post_draft = text,
            UiEvent::SubmitPost => {
                let backend = Arc::clone(&self.backend);
                let text = self.view.post_draft.clone();
                self.spawn(async move {
                    Completion::Posted(dashboard::submit_post(backend.as_ref(), &text).await)
                });
            }
            UiEvent::Shutdown => return false,
        }
        self.publish();
        true
    }

    /// Waits for the next event, fired timer or completed request and handles it.
    /// Returns `false` on shutdown or once every [`UiHandle`] is gone.
    pub async fn step(&mut self) -> bool {
        tokio::select! {
            biased;
            event = self.events.recv() => match event {
                Some(event) => self.dispatch(event),
                None => false,
            },
            Some(joined) = self.tasks.join_next() => {
                self.joined(joined);
                true
            }
            query = self.fetcher.fired() => {
                self.fire(query);
                true
            }
        }
    }

    /// Runs the pending timer and every in-flight request to completion
    /// without taking new events.
    pub async fn settle(&mut self) {
        while !self.tasks.is_empty() || self.fetcher.is_pending() {
            tokio::select! {
                biased;
                Some(joined) = self.tasks.join_next() => self.joined(joined),
                query = self.fetcher.fired() => self.fire(query),
            }
        }
    }

    /// Processes events until shutdown and returns the final page.
    pub async fn run(mut self) -> PageView {
        info!("search controller started");
        while self.step().await {}
        info!(in_flight = self.tasks.len(), "search controller stopped");
        self.view
    }

    fn click(&mut self, target: ClickTarget) {
        if let ClickTarget::SuggestionEntry(index) = target {
            let action = self
                .view
                .suggestions
                .entry(index)
                .map(|entry| entry.action.clone());
            if let Some(EntryAction::Select { text, execute }) = action {
                self.view.input.clone_from(&text);
                self.view.suggestions.hide();
                if execute {
                    self.spawn_search(text);
                }
            }
        }
        if self.dismissal.on_click(&target, &mut self.view) {
            debug!(?target, "dropdown dismissed");
        }
    }

    fn fire(&mut self, query: String) {
        debug!(%query, "suggestion timer fired");
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let suggestions = fetcher::fetch_suggestions(backend.as_ref(), &query).await;
            Completion::Suggestions { query, suggestions }
        });
    }

    fn spawn_search(&mut self, query: String) {
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let outcome = executor::run_search(backend.as_ref(), &query).await;
            Completion::Search { query, outcome }
        });
    }

    fn spawn_dashboard(&mut self) {
        for widget in Widget::ALL {
            let backend = Arc::clone(&self.backend);
            self.spawn(async move {
                Completion::Widget(widget, dashboard::load_widget(backend.as_ref(), widget).await)
            });
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.tasks.spawn(task);
    }

    fn joined(&mut self, joined: Result<Completion, JoinError>) {
        match joined {
            Ok(completion) => self.apply(completion),
            // The page keeps whatever it showed before the request.
            Err(err) => warn!(error = %err, "backend task did not complete"),
        }
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            // No staleness check: a late answer overwrites whatever the dropdown shows.
            Completion::Suggestions { query, suggestions } => {
                debug!(%query, current = %self.view.input, "rendering suggestions");
                render_suggestions(&mut self.view, &suggestions, self.search_on_select);
            }
            Completion::Search { query, outcome } => {
                executor::apply_search_outcome(&mut self.view, &query, outcome);
            }
            Completion::History(outcome) => history::apply_history(&mut self.view, outcome),
            Completion::Widget(widget, html) => {
                self.view.widgets.insert(widget, html);
            }
            Completion::Posted(Ok(())) => {
                self.view.post_draft.clear();
                self.spawn_dashboard();
            }
            Completion::Posted(Err(err)) => warn!(error = %err, "post submission failed"),
        }
        self.publish();
    }

    fn publish(&mut self) {
        for alert in self.view.take_alerts() {
            // No subscribers is fine; the alert is still logged.
            info!(%alert, "alert");
            let _ = self.alerts.send(alert);
        }
        self.snapshots.send_replace(self.view.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::scripted::ScriptedBackend;
    use crate::dashboard::WIDGET_ERROR_HTML;
    use crate::executor::{NO_RESULTS_TEXT, SEARCH_FAILED_ALERT};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::advance;

    fn controller(backend: &ScriptedBackend) -> (SearchController<ScriptedBackend>, UiHandle) {
        SearchController::new(backend.clone(), &ClientConfig::default())
    }

    async fn type_at(controller: &mut SearchController<ScriptedBackend>, text: &str, after_ms: u64) {
        advance(Duration::from_millis(after_ms)).await;
        controller.dispatch(UiEvent::Input(text.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_issue_one_request() {
        let backend = ScriptedBackend::new().with_suggestions(["Hackathon", "Hack"]);
        let (mut controller, _handle) = controller(&backend);
        type_at(&mut controller, "h", 0).await;
        type_at(&mut controller, "ha", 50).await;
        type_at(&mut controller, "hac", 50).await;
        type_at(&mut controller, "hack", 200).await;
        controller.settle().await;

        assert_eq!(backend.suggestion_queries(), vec!["hack"]);
        assert!(controller.view().suggestions.is_visible());
        assert_eq!(
            controller.view().suggestions.entries()[1].markup,
            "<b>Hack</b>"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn input_after_quiet_period_issues_another_request() {
        let backend = ScriptedBackend::new().with_suggestions(["Alumni"]);
        let (mut controller, _handle) = controller(&backend);
        type_at(&mut controller, "a", 0).await;
        controller.settle().await;
        type_at(&mut controller, "al", 400).await;
        controller.settle().await;

        assert_eq!(backend.suggestion_queries(), vec!["a", "al"]);
    }

    #[tokio::test(start_paused = true)]
    async fn query_is_captured_when_scheduled() {
        let backend = ScriptedBackend::new().with_suggestions(["Career Tips"]);
        let (mut controller, _handle) = controller(&backend);
        type_at(&mut controller, "car", 0).await;
        advance(Duration::from_millis(300)).await;
        assert!(controller.step().await, "timer fires");
        controller.view.input = "career t".to_string();
        controller.settle().await;

        assert_eq!(backend.suggestion_queries(), vec!["car"]);
        assert_eq!(
            controller.view().suggestions.entries()[0].markup,
            "<b>Career T</b>ips",
            "markup follows the input at render time"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn suggestion_failure_closes_dropdown_quietly() {
        let backend = ScriptedBackend::new();
        let (mut controller, _handle) = controller(&backend);
        controller.view.suggestions.push(crate::view::ListEntry::plain("old"));
        controller.view.suggestions.show();
        type_at(&mut controller, "x", 0).await;
        controller.settle().await;

        assert!(!controller.view().suggestions.is_visible());
        assert!(controller.view().suggestions.is_empty());
        assert!(controller.view().alerts().is_empty());
    }

    #[tokio::test]
    async fn enter_searches_current_input() {
        let backend = ScriptedBackend::new().with_results(vec![]);
        let (mut controller, _handle) = controller(&backend);
        controller.view.input = "nobody".to_string();
        controller.dispatch(UiEvent::Enter);
        controller.settle().await;

        assert_eq!(backend.search_queries(), vec!["nobody"]);
        assert_eq!(controller.view().suggestions.texts(), vec![NO_RESULTS_TEXT]);
        assert!(controller.view().suggestions.is_visible());
    }

    #[tokio::test]
    async fn search_failure_raises_alert() {
        let backend = ScriptedBackend::new();
        let (mut controller, _handle) = controller(&backend);
        let mut alerts = controller.subscribe_alerts();
        controller.dispatch(UiEvent::Enter);
        controller.settle().await;

        assert_eq!(alerts.try_recv().unwrap(), SEARCH_FAILED_ALERT);
        assert!(alerts.try_recv().is_err(), "raised once");
        assert!(controller.view().alerts().is_empty(), "drained from the page");
    }

    #[tokio::test]
    async fn repeated_failures_alert_each_time_without_growing_snapshots() {
        let backend = ScriptedBackend::new();
        let (mut controller, _handle) = controller(&backend);
        let mut alerts = controller.subscribe_alerts();
        let snapshots = controller.subscribe();
        for _ in 0..3 {
            controller.dispatch(UiEvent::Enter);
            controller.settle().await;
        }

        for _ in 0..3 {
            assert_eq!(alerts.try_recv().unwrap(), SEARCH_FAILED_ALERT);
        }
        assert!(snapshots.borrow().alerts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn picking_a_suggestion_fills_input_without_searching() {
        let backend = ScriptedBackend::new().with_suggestions(["Alumni Meetup"]);
        let (mut controller, _handle) = controller(&backend);
        type_at(&mut controller, "meet", 0).await;
        controller.settle().await;

        controller.dispatch(UiEvent::Click(ClickTarget::SuggestionEntry(0)));
        controller.settle().await;

        assert_eq!(controller.view().input, "Alumni Meetup");
        assert!(!controller.view().suggestions.is_visible());
        assert!(backend.search_queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn search_on_select_commits_picked_suggestion() {
        let backend = ScriptedBackend::new()
            .with_suggestions(["Alumni Meetup"])
            .with_results(vec![json!({"event_name": "Alumni Meetup", "description": "Networking event"})]);
        let config = ClientConfig {
            search_on_select: true,
            ..ClientConfig::default()
        };
        let (mut controller, _handle) = SearchController::new(backend.clone(), &config);
        type_at(&mut controller, "alu", 0).await;
        controller.settle().await;
        controller.dispatch(UiEvent::Click(ClickTarget::SuggestionEntry(0)));
        controller.settle().await;

        assert_eq!(backend.search_queries(), vec!["Alumni Meetup"]);
        assert_eq!(
            controller.view().suggestions.texts(),
            vec!["Alumni Meetup: Networking event"]
        );
        assert!(controller.view().suggestions.is_visible());
    }

    #[tokio::test]
    async fn clicking_a_result_copies_its_text() {
        let backend = ScriptedBackend::new()
            .with_results(vec![json!({"name": "Jane Smith", "career_path": "Data Scientist"})]);
        let (mut controller, _handle) = controller(&backend);
        controller.dispatch(UiEvent::Enter);
        controller.settle().await;
        controller.dispatch(UiEvent::Click(ClickTarget::SuggestionEntry(0)));

        assert_eq!(controller.view().input, "Jane Smith: Data Scientist");
        assert!(!controller.view().suggestions.is_visible());
    }

    #[tokio::test]
    async fn outside_click_dismisses_dropdown() {
        let backend = ScriptedBackend::new().with_results(vec![]);
        let (mut controller, _handle) = controller(&backend);
        controller.dispatch(UiEvent::Enter);
        controller.settle().await;

        controller.dispatch(UiEvent::Click(ClickTarget::SearchInput));
        assert!(controller.view().suggestions.is_visible());
        controller.dispatch(UiEvent::Click(ClickTarget::HistoryPanel));
        assert!(controller.view().suggestions.is_visible());
        controller.dispatch(UiEvent::Click(ClickTarget::Elsewhere));
        assert!(!controller.view().suggestions.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn late_suggestions_overwrite_search_results() {
        let backend = ScriptedBackend::new()
            .with_suggestions(["Gala night"])
            .with_suggestion_delay(Duration::from_secs(1))
            .with_results(vec![json!({"event_name": "Gala", "description": "Annual"})]);
        let (mut controller, _handle) = controller(&backend);
        type_at(&mut controller, "gala", 0).await;
        advance(Duration::from_millis(300)).await;
        assert!(controller.step().await, "timer fires");
        controller.dispatch(UiEvent::Enter);
        controller.settle().await;

        assert_eq!(controller.view().suggestions.texts(), vec!["Gala night"]);
    }

    #[tokio::test(start_paused = true)]
    async fn late_search_results_overwrite_suggestions() {
        let backend = ScriptedBackend::new()
            .with_suggestions(["Gala night"])
            .with_results(vec![json!({"event_name": "Gala", "description": "Annual"})])
            .with_search_delay(Duration::from_secs(1));
        let (mut controller, _handle) = controller(&backend);
        type_at(&mut controller, "gala", 0).await;
        controller.dispatch(UiEvent::Enter);
        advance(Duration::from_millis(300)).await;
        assert!(controller.step().await, "timer fires");
        assert!(controller.step().await, "suggestions arrive");
        assert_eq!(controller.view().suggestions.texts(), vec!["Gala night"]);

        controller.settle().await;
        assert_eq!(controller.view().suggestions.texts(), vec!["Gala: Annual"]);
        assert_eq!(backend.search_queries(), vec!["gala"]);
    }

    struct CrashingBackend;

    impl SearchBackend for CrashingBackend {
        async fn suggestions(&self, query: &str) -> Result<Vec<String>, ClientError> {
            panic!("suggestion handler crashed on {query:?}")
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResultItem>, ClientError> {
            Ok(Vec::new())
        }

        async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
            Ok(Vec::new())
        }

        async fn widget(&self, _endpoint: &str) -> Result<String, ClientError> {
            Ok(String::new())
        }

        async fn submit_post(&self, _text: &str) -> Result<(), ClientError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn crashed_request_does_not_wedge_settle() {
        let (mut controller, _handle) =
            SearchController::new(CrashingBackend, &ClientConfig::default());
        controller.dispatch(UiEvent::Input("a".to_string()));
        tokio::time::timeout(Duration::from_secs(2), controller.settle())
            .await
            .expect("settle returns after a crashed task");
        assert_eq!(controller.in_flight(), 0);

        controller.dispatch(UiEvent::Enter);
        controller.settle().await;
        assert_eq!(controller.view().suggestions.texts(), vec![NO_RESULTS_TEXT]);
    }

    #[tokio::test]
    async fn history_toggle_loads_on_open_only() {
        let backend = ScriptedBackend::new().with_history(["gala", "alex"]);
        let (mut controller, _handle) = controller(&backend);
        controller.dispatch(UiEvent::ToggleHistory);
        controller.settle().await;
        assert_eq!(controller.view().history.texts(), vec!["gala", "alex"]);

        controller.dispatch(UiEvent::ToggleHistory);
        assert_eq!(controller.in_flight(), 0);
        assert!(!controller.view().history.is_visible());
    }

    #[tokio::test]
    async fn successful_post_clears_draft_and_reloads_dashboard() {
        let backend = ScriptedBackend::new()
            .accepting_posts()
            .with_widget("/api/feed", "<p>hello world</p>");
        let (mut controller, _handle) = controller(&backend);
        controller.dispatch(UiEvent::EditPost("hello world".to_string()));
        controller.dispatch(UiEvent::SubmitPost);
        controller.settle().await;

        assert!(controller.view().post_draft.is_empty());
        assert_eq!(controller.view().widget(Widget::Feed), Some("<p>hello world</p>"));
        assert_eq!(controller.view().widget(Widget::Leaderboard), Some(WIDGET_ERROR_HTML));
    }

    #[tokio::test]
    async fn failed_post_keeps_draft() {
        let backend = ScriptedBackend::new();
        let (mut controller, _handle) = controller(&backend);
        controller.dispatch(UiEvent::EditPost("draft".to_string()));
        controller.dispatch(UiEvent::SubmitPost);
        controller.settle().await;
        assert_eq!(controller.view().post_draft, "draft");
        assert!(controller.view().widgets.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_processes_handle_events_until_shutdown() {
        let backend = ScriptedBackend::new().with_suggestions(["Career"]);
        let (controller, handle) = controller(&backend);
        let mut snapshots = controller.subscribe();
        let task = tokio::spawn(controller.run());

        assert!(handle.input("car"));
        snapshots
            .wait_for(|view| view.suggestions.is_visible())
            .await
            .unwrap();
        assert!(handle.shutdown());
        let view = task.await.unwrap();

        assert_eq!(view.input, "car");
        assert_eq!(view.suggestions.texts(), vec!["Career"]);
        assert!(!handle.input("late"), "controller has stopped");
    }
}
