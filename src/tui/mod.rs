//! Terminal User Interface Module
//!
//! Front-end for the AiPrio prioritization service: upload a CSV of
//! requests, preview one, retrieve its analysis, then export it. A floating
//! assistant answers questions about the latest analysis.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │        AiPrio Request Prioritization  ☾  API key                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ F2 Analysis │ F3 Report │ F4 About                              │
//! │  ┌─ Progress ──────────────────────────────────────────────┐   │
//! │  │ ✓ Upload → ● Select & Preview → ○ Analysis   [████   ]  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │  ┌─ CSV File ──────────────────────────────────────────────┐   │
//! │  │ requests.csv                                             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │  ┌─ Requests ───────────┐┌─ Preview ────────┐┌─ Assistant ─┐   │
//! │  │ ▶ Row 0 - Payroll    ││ Title │ Payroll  ││ You 9:01 AM │   │
//! │  │   Row 1 - Intake     ││ ...              ││ > _         │   │
//! │  └──────────────────────┘└──────────────────┘└─────────────┘   │
//! │  Ready │ [Tab] Focus [Ctrl+O] Chat [Ctrl+T] Theme [F1] Help     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! State lives in [`crate::page::Page`]; this module maps key events onto
//! it and draws it.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, Focus, View};
pub use event::{AppAction, EventHandler};

use crate::api::Backend;
use crate::config::Config;
use crate::report::export::ClipboardSink;
use crate::storage::KeyValueStore;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::Arc;
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(
    config: Config,
    backend: Arc<dyn Backend>,
    store: Box<dyn KeyValueStore>,
    clipboard: Box<dyn ClipboardSink>,
) -> anyhow::Result<()> {
    info!("Starting TUI against {}", config.backend.base_url);

    let mut terminal = init_terminal()?;
    let size = terminal.size()?;
    let mut events = EventHandler::new(config.ui.tick_rate);
    let mut app = App::new(config, backend, store, clipboard, (size.width, size.height));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Completed backend calls
        app.poll_events();

        match events.next().await {
            Some(action) => app.handle_action(action).await,
            None => break,
        }

        if app.should_quit {
            break;
        }
    }

    info!("TUI exited normally");
    Ok(())
}
