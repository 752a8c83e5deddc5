use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alumni_search::config::DEFAULT_BASE_URL;
use alumni_search::dashboard::{self, Widget};
use alumni_search::executor::{apply_search_outcome, run_search};
use alumni_search::fetcher::fetch_suggestions;
use alumni_search::history::{apply_history, load_history};
use alumni_search::render::render_suggestions;
use alumni_search::{
    ClickTarget, ClientConfig, Emphasis, Highlighter, HttpBackend, ListWidget, PageView,
    SearchController, ThemeStore, UiEvent,
};
use atty::Stream;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "alumni-search",
    about = "Search the alumni portal from a terminal",
    version
)]
pub struct Cli {
    /// Backend origin serving the `/api/...` endpoints.
    #[arg(long, global = true, env = "ALUMNI_SEARCH_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value_t = 10)]
    timeout: u64,

    /// File holding the persisted theme preference.
    #[arg(long, global = true, env = "ALUMNI_SEARCH_THEME_FILE")]
    theme_file: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch suggestions for partial input once.
    Suggest {
        /// Text typed so far.
        text: String,
    },
    /// Run a committed search.
    Search {
        /// Query to send.
        query: String,
    },
    /// List previous searches.
    History,
    /// Load every dashboard widget.
    Dashboard,
    /// Publish a post to the feed.
    Post {
        /// Post body.
        text: String,
    },
    /// Show or flip the persisted theme.
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },
    /// Drive the search page line by line (`help` lists commands).
    Interactive {
        /// Quiet period before suggestions are fetched, in milliseconds.
        #[arg(long, default_value_t = 300)]
        quiet_ms: u64,
        /// Commit a search as soon as a suggestion is clicked.
        #[arg(long)]
        search_on_select: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeAction {
    Show,
    Toggle,
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ClientConfig {
        base_url: cli.base_url.clone(),
        request_timeout: Duration::from_secs(cli.timeout.max(1)),
        ..ClientConfig::default()
    };
    let config = match &cli.theme_file {
        Some(path) => ClientConfig {
            theme_path: path.clone(),
            ..config
        },
        None => config,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli, config))
}

async fn dispatch(cli: Cli, mut config: ClientConfig) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Suggest { text } => {
            handle_suggest(&HttpBackend::new(&config)?, text, cli.json).await
        }
        Command::Search { query } => {
            handle_search(&HttpBackend::new(&config)?, query, cli.json).await
        }
        Command::History => handle_history(&HttpBackend::new(&config)?, cli.json).await,
        Command::Dashboard => handle_dashboard(HttpBackend::new(&config)?, cli.json).await,
        Command::Post { text } => handle_post(&HttpBackend::new(&config)?, text).await,
        Command::Theme { action } => handle_theme(&config, action, cli.json),
        Command::Interactive {
            quiet_ms,
            search_on_select,
        } => {
            config.quiet_period = Duration::from_millis(quiet_ms);
            config.search_on_select = search_on_select;
            handle_interactive(HttpBackend::new(&config)?, config).await
        }
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn handle_suggest(
    backend: &HttpBackend,
    text: String,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let suggestions = fetch_suggestions(backend, &text).await;
    let mut view = PageView::new();
    view.input = text;
    render_suggestions(&mut view, &suggestions, false);

    if as_json {
        let payload = json!({
            "query": view.input,
            "suggestions": view.suggestions.entries().iter().map(|entry| {
                json!({"text": entry.text, "markup": entry.markup})
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if view.suggestions.is_visible() {
        print_list("Suggestions", &view.suggestions, Some(view.input.as_str()));
    } else {
        println!("No suggestions for \"{}\".", view.input);
    }
    Ok(())
}

async fn handle_search(
    backend: &HttpBackend,
    query: String,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let outcome = run_search(backend, &query).await;
    let mut view = PageView::new();
    view.input.clone_from(&query);
    apply_search_outcome(&mut view, &query, outcome);
    if let Some(alert) = view.take_alerts().into_iter().next() {
        return Err(alert.into());
    }

    if as_json {
        let payload = json!({
            "query": query,
            "results": view.suggestions.entries().iter().map(|entry| {
                json!({"text": entry.text, "class": entry.class})
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_list(&format!("Results for \"{query}\""), &view.suggestions, None);
    }
    Ok(())
}

async fn handle_history(backend: &HttpBackend, as_json: bool) -> Result<(), Box<dyn Error>> {
    let mut view = PageView::new();
    apply_history(&mut view, load_history(backend).await);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view.history.texts())?);
    } else if view.history.is_empty() {
        println!("No search history.");
    } else {
        print_list("Search History", &view.history, None);
    }
    Ok(())
}

async fn handle_dashboard(backend: HttpBackend, as_json: bool) -> Result<(), Box<dyn Error>> {
    let widgets = dashboard::load_all(Arc::new(backend)).await;
    if as_json {
        let payload: serde_json::Map<_, _> = widgets
            .iter()
            .map(|(widget, html)| (widget.region().to_string(), json!(html)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for (widget, html) in &widgets {
            println!("[{widget}]");
            println!("{html}\n");
        }
    }
    Ok(())
}

async fn handle_post(backend: &HttpBackend, text: String) -> Result<(), Box<dyn Error>> {
    dashboard::submit_post(backend, &text).await?;
    println!("Post submitted.");
    Ok(())
}

fn handle_theme(
    config: &ClientConfig,
    action: ThemeAction,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let store = ThemeStore::new(&config.theme_path);
    let theme = match action {
        ThemeAction::Show => store.load()?,
        ThemeAction::Toggle => store.toggle()?,
    };
    if as_json {
        let payload = json!({ "theme": theme, "path": store.path().display().to_string() });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{theme}");
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScriptLine {
    Event(UiEvent),
    Wait(Duration),
    Show,
    Help,
    Quit,
}

const INTERACTIVE_HELP: &str = "\
commands:
  type <text>        replace the search input (schedules suggestions)
  enter              run a search for the input
  click <target>     input | dropdown | suggestion:N | history | history:N | <widget> | page
  history            toggle the search history panel
  dashboard          reload the dashboard widgets
  draft <text>       set the post composer text
  post               submit the draft
  wait <ms>          let timers and requests progress
  show               print the page
  quit";

async fn handle_interactive(
    backend: HttpBackend,
    config: ClientConfig,
) -> Result<(), Box<dyn Error>> {
    let (controller, handle) = SearchController::new(backend, &config);
    let mut raised = controller.subscribe_alerts();
    let page = controller.subscribe();
    let session = tokio::spawn(controller.run());

    let alerts = tokio::spawn(async move {
        loop {
            match raised.recv().await {
                Ok(alert) => eprintln!("! {alert}"),
                Err(RecvError::Lagged(missed)) => warn!(missed, "alerts dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    handle.send(UiEvent::LoadDashboard);
    println!("{INTERACTIVE_HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_script_line(&line) {
            Ok(Some(ScriptLine::Event(event))) => {
                if !handle.send(event) {
                    break;
                }
            }
            Ok(Some(ScriptLine::Wait(delay))) => tokio::time::sleep(delay).await,
            Ok(Some(ScriptLine::Show)) => {
                let view = page.borrow().clone();
                print_page(&view);
            }
            Ok(Some(ScriptLine::Help)) => println!("{INTERACTIVE_HELP}"),
            Ok(Some(ScriptLine::Quit)) => break,
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }

    handle.shutdown();
    let view = session.await?;
    alerts.abort();
    print_page(&view);
    Ok(())
}

fn parse_script_line(line: &str) -> Result<Option<ScriptLine>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (command, rest) = match line.trim_start().split_once(' ') {
        Some((command, rest)) => (command, rest),
        None => (line.trim(), ""),
    };
    let parsed = match command {
        "" => return Ok(None),
        "type" => ScriptLine::Event(UiEvent::Input(rest.to_string())),
        "enter" => ScriptLine::Event(UiEvent::Enter),
        "click" => ScriptLine::Event(UiEvent::Click(parse_click_target(rest.trim())?)),
        "history" => ScriptLine::Event(UiEvent::ToggleHistory),
        "dashboard" => ScriptLine::Event(UiEvent::LoadDashboard),
        "draft" => ScriptLine::Event(UiEvent::EditPost(rest.to_string())),
        "post" => ScriptLine::Event(UiEvent::SubmitPost),
        "wait" => {
            let ms: u64 = rest
                .trim()
                .parse()
                .map_err(|_| format!("wait expects milliseconds, got {rest:?}"))?;
            ScriptLine::Wait(Duration::from_millis(ms))
        }
        "show" => ScriptLine::Show,
        "help" => ScriptLine::Help,
        "quit" | "exit" => ScriptLine::Quit,
        other => return Err(format!("unknown command {other:?}; try `help`")),
    };
    Ok(Some(parsed))
}

fn parse_click_target(raw: &str) -> Result<ClickTarget, String> {
    let indexed = |prefix: &str| -> Result<Option<usize>, String> {
        match raw.strip_prefix(prefix) {
            Some(index) => index
                .parse()
                .map(Some)
                .map_err(|_| format!("bad entry index in {raw:?}")),
            None => Ok(None),
        }
    };
    if let Some(index) = indexed("suggestion:")? {
        return Ok(ClickTarget::SuggestionEntry(index));
    }
    if let Some(index) = indexed("history:")? {
        return Ok(ClickTarget::HistoryEntry(index));
    }
    Ok(match raw {
        "input" => ClickTarget::SearchInput,
        "dropdown" | "suggestions" => ClickTarget::SuggestionsList,
        "history" => ClickTarget::HistoryPanel,
        other => Widget::from_region(other)
            .map(ClickTarget::Widget)
            .unwrap_or(ClickTarget::Elsewhere),
    })
}

fn print_page(view: &PageView) {
    println!("Search: {}", view.input);
    if view.suggestions.is_visible() {
        print_list("Dropdown", &view.suggestions, Some(view.input.as_str()));
    }
    if view.history.is_visible() {
        print_list("Search History", &view.history, None);
    }
    if !view.post_draft.is_empty() {
        println!("Draft: {}", view.post_draft);
    }
    for (widget, html) in &view.widgets {
        println!("[{widget}] {}", snippet(html, 72));
    }
}

fn print_list(title: &str, list: &ListWidget, term: Option<&str>) {
    let highlighter = term
        .filter(|_| stdout_is_tty())
        .map(|term| Highlighter::new(term, Emphasis::Markdown));
    let mut body = String::new();
    for (index, entry) in list.entries().iter().enumerate() {
        let label = match &highlighter {
            Some(highlighter) => highlighter.apply(&entry.text),
            None => entry.text.clone(),
        };
        let tag = entry
            .class
            .map(|class| format!(" ({class})"))
            .unwrap_or_default();
        body.push_str(&format!("{index}. {label}{tag}\n"));
    }
    render_markdown_block(title, &body);
}

fn snippet(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn markdown_skin() -> MadSkin {
    MadSkin::default()
}

fn render_markdown_block(title: &str, body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return;
    }
    println!("\n{title}:");
    if stdout_is_tty() {
        let skin = markdown_skin();
        let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{trimmed}");
    }
}
