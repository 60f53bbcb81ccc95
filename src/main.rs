//! dashfeed — news, trending movies and social posts in one terminal feed.
//!
//! ## Architecture overview
//!
//! ```text
//!             FeedRequest              PollMsg
//! ┌──────────┐ ─────────► ┌──────────┐ ─────────► ┌──────────┐  draw()  ┌──────────┐
//! │  app.rs  │            │  poll.rs │            │  app.rs  │ ───────► │  ui.rs   │
//! │ (state)  │            │ (thread) │            │ (state)  │          │ (render) │
//! └──────────┘            └──────────┘            └──────────┘          └──────────┘
//!                              │                       ▲
//!                         cache.rs                     │ handle_key_event()
//!                         source/                 ┌──────────┐
//!                                                 │ input.rs │
//!                                                 └──────────┘
//! ```
//!
//! * **`source/`** — the `DataSource` trait, the content model, and the
//!   news, movie and social providers.
//! * **`cache`** — per-provider page cache keyed by query and categories.
//! * **`poll`** — background thread that fans a request out to every
//!   provider and reports once all of them settled.
//! * **`feed`** — merges provider pages into one deduplicated, shuffled,
//!   reorderable list and tracks pagination.
//! * **`favorites`**, **`prefs`**, **`storage`** — persisted user state.
//! * **`app`** — owns all application state; **`ui`** draws it;
//!   **`input`** maps keys to `App` mutations.
//! * **`main`** — wires everything together: config, logging, terminal
//!   setup and the event loop.

mod app;
mod cache;
mod config;
mod debounce;
mod error;
mod favorites;
mod feed;
mod input;
mod poll;
mod prefs;
mod source;
mod storage;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use feed::Shuffle;
use input::Command;
use poll::{PollMsg, Poller};
use source::{DataSource, MovieSource, NewsApiSource, SocialSource};
use storage::JsonFileStore;

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Raw mode and the alternate screen last exactly as long as this value.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Log to a file: stdout belongs to the TUI.
fn init_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let path = config.log_file();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dashfeed=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_sources(config: &Config) -> Result<Vec<Box<dyn DataSource>>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent(concat!("dashfeed/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;

    if config.news_api_key.is_empty() {
        warn!("NEWS_API_KEY is not set; news requests will fail");
    }
    if config.tmdb_api_key.is_empty() {
        warn!("TMDB_API_KEY is not set; movie requests will fail");
    }

    Ok(vec![
        Box::new(NewsApiSource::new(
            client.clone(),
            &config.news_base_url,
            &config.news_api_key,
        )),
        Box::new(MovieSource::new(
            client,
            &config.tmdb_base_url,
            &config.tmdb_api_key,
        )),
        Box::new(SocialSource::new(Utc::now())),
    ])
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let config = Config::from_env();
    init_logging(&config)?;
    info!(data_dir = %config.data_dir.display(), page_size = config.page_size, "starting");

    install_panic_hook();

    // -- start background fetching -------------------------------------------
    let sources = build_sources(&config)?;
    let (handle, rx) = poll::spawn(Poller::new(sources, config.source_page_size()));

    let store = JsonFileStore::new(&config.data_dir);
    let mut app = App::new(Box::new(store), Shuffle::random(), config.search_debounce);
    app.start();

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;

    // Each iteration: drain poller messages, fire due searches, forward new
    // requests, render, then wait up to one tick for a key.
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = rx.try_recv() {
            match msg {
                PollMsg::Batch(batch) => app.on_batch(batch),
                PollMsg::Failed(reason) => app.on_poller_failed(&reason),
            }
        }

        app.tick(Instant::now());
        for request in app.take_requests() {
            if !handle.request(request) {
                app.on_poller_failed("background fetcher stopped");
            }
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(Command::OpenLink(url)) =
                    input::handle_key_event(&mut app, key, Instant::now())
                {
                    match open::that(&url) {
                        Ok(()) => app.status = format!("Opened {url}"),
                        Err(e) => {
                            warn!(error = %e, url = %url, "failed to open link");
                            app.status = format!("Could not open link: {e}");
                        }
                    }
                }
            }
        }

        if app.quit {
            break;
        }
    }

    info!("exiting");
    Ok(())
}
