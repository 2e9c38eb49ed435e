//! Page View-Model
//!
//! All view state of the front-end in one struct, built once at start-up
//! from a [`PageLayout`] and owned by the controller. Rendering reads it;
//! only the controller mutates it.

pub mod chat;
pub mod layout;
pub mod tabs;
pub mod theme;
pub mod toast;
pub mod wizard;
pub mod workflow;

pub use chat::{ChatChrome, ChatHistory, ChatMessage, ChatPhase, ChatWidget, Sender};
pub use layout::{Debouncer, TableLayout};
pub use tabs::{Phase, TabSet, TabSpec};
pub use theme::{Appearance, ThemeMode};
pub use toast::{ToastLevel, ToastPhase, ToastQueue, ToastTimings};
pub use wizard::{StepWizard, WizardStep};
pub use workflow::{RequestOption, Workflow, WorkflowState};

use crate::config::UiConfig;
use crate::storage::KeyValueStore;
use std::time::Instant;

pub const ANALYSIS_TAB: &str = "analysis";
pub const REPORT_TAB: &str = "report";
pub const ABOUT_TAB: &str = "about";

/// Which widgets the page has
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub tabs: Vec<TabSpec>,
    pub default_tab: Option<&'static str>,
    pub wizard: bool,
    pub chat: bool,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            tabs: vec![
                TabSpec {
                    name: ANALYSIS_TAB,
                    label: "Analysis",
                },
                TabSpec {
                    name: REPORT_TAB,
                    label: "Report",
                },
                TabSpec {
                    name: ABOUT_TAB,
                    label: "About",
                },
            ],
            default_tab: Some(ANALYSIS_TAB),
            wizard: true,
            chat: true,
        }
    }
}

/// Messages of the operations currently awaited; the newest is shown
#[derive(Debug, Clone, Default)]
pub struct Spinner {
    active: Vec<String>,
}

impl Spinner {
    pub fn show(&mut self, message: impl Into<String>) {
        self.active.push(message.into());
    }

    pub fn hide(&mut self, message: &str) {
        if let Some(pos) = self.active.iter().position(|m| m == message) {
            self.active.remove(pos);
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.active.last().map(String::as_str)
    }

    pub fn is_visible(&self) -> bool {
        !self.active.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub tabs: TabSet,
    pub appearance: Appearance,
    pub wizard: Option<StepWizard>,
    pub chat: Option<ChatWidget>,
    pub toasts: ToastQueue,
    pub workflow: Workflow,
    pub spinner: Spinner,
    pub table_layout: TableLayout,
    pub viewport: (u16, u16),
    resize: Debouncer<(u16, u16)>,
    table_card_columns: u16,
}

impl Page {
    /// Build the view-model, apply the persisted theme, replay the chat
    /// history and size everything for `viewport`
    pub fn build(
        layout: &PageLayout,
        ui: &UiConfig,
        store: &dyn KeyValueStore,
        viewport: (u16, u16),
    ) -> Self {
        let chat = layout.chat.then(|| {
            ChatWidget::new(
                ChatHistory::load(store),
                ui.chat_close_delay,
                ui.narrow_columns,
            )
        });

        let mut page = Self {
            tabs: TabSet::new(&layout.tabs, layout.default_tab, ui.tab_transition),
            appearance: Appearance::new(layout.chat),
            wizard: layout.wizard.then(StepWizard::default),
            chat,
            toasts: ToastQueue::new(ToastTimings::from(ui)),
            workflow: Workflow::default(),
            spinner: Spinner::default(),
            table_layout: TableLayout::Columns,
            viewport,
            resize: Debouncer::new(ui.resize_debounce),
            table_card_columns: ui.table_card_columns,
        };
        page.appearance.init_theme(store);
        if let Some(wizard) = page.wizard.as_mut() {
            wizard.set_step(WizardStep::Upload);
        }
        page.apply_viewport(viewport);
        page
    }

    /// Current 1-based wizard step
    pub fn step(&self) -> Option<usize> {
        self.wizard.as_ref().and_then(StepWizard::current)
    }

    /// No-op without a wizard; out-of-range numbers are rejected
    pub fn set_step(&mut self, n: usize) -> bool {
        match self.wizard.as_mut() {
            Some(wizard) => wizard.set_step_number(n),
            None => false,
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, level: ToastLevel, now: Instant) {
        self.toasts.push(message, level, now);
    }

    /// Queue a viewport change; applied once resizing settles
    pub fn request_resize(&mut self, columns: u16, rows: u16, now: Instant) {
        self.resize.call((columns, rows), now);
    }

    pub fn apply_viewport(&mut self, (columns, rows): (u16, u16)) {
        self.viewport = (columns, rows);
        self.table_layout = TableLayout::for_width(columns, self.table_card_columns);
        if let Some(chat) = self.chat.as_mut() {
            chat.resize(columns, rows);
        }
    }

    /// Advance timers: tab fades, chat close, toasts, debounced resize
    pub fn tick(&mut self, now: Instant) {
        self.tabs.tick(now);
        if let Some(chat) = self.chat.as_mut() {
            chat.tick(now);
        }
        self.toasts.tick(now);
        if let Some(viewport) = self.resize.poll(now) {
            self.apply_viewport(viewport);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, THEME_KEY};
    use std::time::Duration;

    fn page(store: &MemoryStore, viewport: (u16, u16)) -> Page {
        Page::build(&PageLayout::default(), &UiConfig::default(), store, viewport)
    }

    #[test]
    fn test_build_applies_persisted_state() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "dark").unwrap();

        let page = page(&store, (120, 40));
        assert_eq!(page.appearance.mode, ThemeMode::Dark);
        assert_eq!(page.tabs.active_name(), Some(ANALYSIS_TAB));
        assert_eq!(page.step(), Some(1));
        assert_eq!(page.table_layout, TableLayout::Columns);
    }

    #[test]
    fn test_layout_without_optional_widgets() {
        let layout = PageLayout {
            wizard: false,
            chat: false,
            ..PageLayout::default()
        };
        let store = MemoryStore::new();
        let mut page = Page::build(&layout, &UiConfig::default(), &store, (120, 40));
        assert!(!page.set_step(2));
        assert_eq!(page.step(), None);
        assert!(page.chat.is_none());
        assert_eq!(page.appearance.chat_toggle, None);
    }

    #[test]
    fn test_resize_is_debounced() {
        let start = Instant::now();
        let store = MemoryStore::new();
        let mut page = page(&store, (120, 40));

        page.request_resize(90, 30, start);
        page.request_resize(60, 30, start + Duration::from_millis(100));
        page.tick(start + Duration::from_millis(200));
        assert_eq!(page.viewport, (120, 40));

        page.tick(start + Duration::from_millis(350));
        assert_eq!(page.viewport, (60, 30));
        assert_eq!(page.table_layout, TableLayout::Cards);
        assert!(page.chat.as_ref().unwrap().chrome.full_width);
    }

    #[test]
    fn test_spinner_tracks_overlapping_operations() {
        let mut spinner = Spinner::default();
        spinner.show("Uploading CSV...");
        spinner.show("Retrieving analysis...");
        spinner.hide("Uploading CSV...");
        assert_eq!(spinner.message(), Some("Retrieving analysis..."));
        spinner.hide("Retrieving analysis...");
        assert!(!spinner.is_visible());
    }
}
