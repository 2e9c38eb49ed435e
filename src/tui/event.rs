//! Event Handling
//!
//! Maps keyboard, resize and timer events to controller actions.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

/// Actions that can be performed in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Quit the application
    Quit,
    /// Quit without cleanup prompts
    ForceQuit,
    /// Enter: acts on the focused field
    Submit,
    ToggleHelp,
    /// Close overlays
    Escape,
    NextFocus,
    PrevFocus,
    /// Open the tab behind link N
    OpenTab(usize),
    ToggleTheme,
    ToggleChat,
    ClearChat,
    Preview,
    Analyze,
    Download,
    Copy,
    Email,
    ClearCache,
    Up,
    Down,
    PageUp,
    PageDown,
    /// Regular input for the focused text field
    Input(KeyEvent),
    Resize(u16, u16),
    /// Timer tick for animations
    Tick,
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::Receiver<AppAction>,
    _tx: mpsc::Sender<AppAction>,
}

impl EventHandler {
    /// Create a new event handler with specified tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let tx_clone = tx.clone();

        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();

                tokio::select! {
                    _ = tick => {
                        if tx_clone.send(AppAction::Tick).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(evt)) = crossterm_event => {
                        if let Some(action) = map_event(evt) {
                            if tx_clone.send(action).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Wait for the next action
    pub async fn next(&mut self) -> Option<AppAction> {
        self.rx.recv().await
    }
}

/// Map a crossterm event to an app action
pub fn map_event(event: Event) -> Option<AppAction> {
    match event {
        // Windows reports releases too
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key_event(key),
        Event::Resize(columns, rows) => Some(AppAction::Resize(columns, rows)),
        _ => None,
    }
}

/// Map a key event to an app action
pub fn map_key_event(key: KeyEvent) -> Option<AppAction> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(AppAction::ForceQuit),
        (KeyModifiers::CONTROL, KeyCode::Char('q')) => Some(AppAction::Quit),

        (KeyModifiers::CONTROL, KeyCode::Char('t')) => Some(AppAction::ToggleTheme),
        (KeyModifiers::CONTROL, KeyCode::Char('o')) => Some(AppAction::ToggleChat),
        (KeyModifiers::CONTROL, KeyCode::Char('l')) => Some(AppAction::ClearChat),
        (KeyModifiers::CONTROL, KeyCode::Char('p')) => Some(AppAction::Preview),
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => Some(AppAction::Analyze),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => Some(AppAction::Download),
        (KeyModifiers::CONTROL, KeyCode::Char('y')) => Some(AppAction::Copy),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) => Some(AppAction::Email),
        (KeyModifiers::CONTROL, KeyCode::Char('k')) => Some(AppAction::ClearCache),

        (KeyModifiers::SHIFT, KeyCode::BackTab) => Some(AppAction::PrevFocus),

        (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
            KeyCode::Esc => Some(AppAction::Escape),
            KeyCode::Enter => Some(AppAction::Submit),
            KeyCode::F(1) => Some(AppAction::ToggleHelp),
            KeyCode::F(n @ 2..=4) => Some(AppAction::OpenTab(n as usize - 2)),
            KeyCode::Up => Some(AppAction::Up),
            KeyCode::Down => Some(AppAction::Down),
            KeyCode::PageUp => Some(AppAction::PageUp),
            KeyCode::PageDown => Some(AppAction::PageDown),
            KeyCode::Tab => Some(AppAction::NextFocus),
            KeyCode::BackTab => Some(AppAction::PrevFocus),
            _ => Some(AppAction::Input(key)),
        },

        _ => Some(AppAction::Input(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(modifiers: KeyModifiers, code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_shortcuts() {
        let ctrl = KeyModifiers::CONTROL;
        assert_eq!(map_key_event(key(ctrl, KeyCode::Char('t'))), Some(AppAction::ToggleTheme));
        assert_eq!(map_key_event(key(ctrl, KeyCode::Char('r'))), Some(AppAction::Analyze));
        assert_eq!(map_key_event(key(ctrl, KeyCode::Char('c'))), Some(AppAction::ForceQuit));
        assert_eq!(
            map_key_event(key(KeyModifiers::SHIFT, KeyCode::BackTab)),
            Some(AppAction::PrevFocus)
        );
    }

    #[test]
    fn test_function_keys_open_tabs() {
        let none = KeyModifiers::NONE;
        assert_eq!(map_key_event(key(none, KeyCode::F(2))), Some(AppAction::OpenTab(0)));
        assert_eq!(map_key_event(key(none, KeyCode::F(4))), Some(AppAction::OpenTab(2)));
        assert_eq!(map_key_event(key(none, KeyCode::F(1))), Some(AppAction::ToggleHelp));
    }

    #[test]
    fn test_characters_are_input() {
        let event = key(KeyModifiers::SHIFT, KeyCode::Char('A'));
        assert_eq!(map_key_event(event), Some(AppAction::Input(event)));
    }

    #[test]
    fn test_resize_and_release() {
        assert_eq!(map_event(Event::Resize(90, 30)), Some(AppAction::Resize(90, 30)));

        let mut release = key(KeyModifiers::NONE, KeyCode::Enter);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_event(Event::Key(release)), None);
    }
}
