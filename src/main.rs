//! hn-live — page through Hacker News and watch new stories arrive, in the
//! terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  append  ┌───────────┐  prepend  ┌──────────┐
//! │ feed.rs  │ ───────► │ FeedState │ ◄──────── │ poll.rs  │
//! │ (pages)  │          │ (shared)  │           │ (timer)  │
//! └──────────┘          └───────────┘           └──────────┘
//!       │ render_batch / show_detail         notify │
//!       └──────────────► present.rs ◄───────────────┘
//!                           │ UiEvent (channel)
//!                           ▼
//!                     ┌──────────┐  draw()  ┌──────────┐
//!                     │  app.rs  │ ───────► │  ui.rs   │
//!                     │ (view)   │          │ (render) │
//!                     └──────────┘          └──────────┘
//!                           ▲ handle_key_event()
//!                     ┌──────────┐
//!                     │ input.rs │
//!                     └──────────┘
//! ```
//!
//! * **`source/`** — the `DataSource` trait and the Hacker News client.
//! * **`feed`** — the shared accumulated list, paginated loading, detail view.
//! * **`poll`** — the live poller task.
//! * **`present`** — the `Presenter` seam and its channel implementation.
//! * **`app`** — view state (rows, selection, detail, banner).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations and async actions.
//! * **`main`** — wires everything together: parse args, start the async
//!   side, set up the terminal, and run the event loop.

mod app;
mod config;
mod error;
mod feed;
mod input;
mod poll;
mod present;
mod source;
mod text;
mod ui;

#[cfg(test)]
mod test_utils;

use std::fs::File;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{Action, App};
use config::Config;
use feed::{Feed, FeedState};
use poll::LivePoller;
use present::ChannelPresenter;
use source::HackerNewsSource;

type HnFeed = Feed<HackerNewsSource, ChannelPresenter>;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
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

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Logs go to `--log-file` if given; the terminal itself belongs to the UI.
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    match &config.log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::sink).init(),
    }
    Ok(())
}

/// Hand a UI action to the async side.  Each action runs as its own task so
/// the event loop never waits on the network.
fn dispatch(feed: &HnFeed, action: Action) {
    let feed = feed.clone();
    match action {
        Action::LoadMore => {
            tokio::spawn(async move { feed.load_next_page().await });
        }
        Action::OpenDetail(item) => {
            tokio::spawn(async move { feed.open_detail(&item).await });
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;
    install_panic_hook();

    // -- async side ----------------------------------------------------------
    // One worker: feed logic is a single logical thread that yields at every
    // fetch.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("hn-live-io")
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let enter = runtime.enter();

    let (presenter, rx) = ChannelPresenter::new();
    let presenter = Arc::new(presenter);
    let source = Arc::new(HackerNewsSource::new(&config.base_url));
    let state = FeedState::new(config.categories.clone(), config.live_buffer).into_shared();

    let feed = Feed::new(
        source.clone(),
        presenter.clone(),
        state.clone(),
        config.page_size(),
    );
    let poller = LivePoller::new(source, presenter, state);

    info!(
        base_url = %config.base_url,
        categories = ?config.categories,
        page_size = config.page_size,
        "starting"
    );
    dispatch(&feed, Action::LoadMore);
    let poller_task = poller.spawn(config.poll_interval());

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(config.notify_duration());

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain presenter events and expire the banner.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Process presenter events
        let now = Instant::now();
        while let Ok(event) = rx.try_recv() {
            app.apply(event, now);
        }
        app.expire_notification(now);

        // 2. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 3. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(action) = input::handle_key_event(&mut app, key) {
                    dispatch(&feed, action);
                }
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.  Fetches have no
    // timeout, so don't wait on them.
    drop(guard);
    poller_task.abort();
    drop(enter);
    runtime.shutdown_background();
    info!("exiting");
    Ok(())
}
