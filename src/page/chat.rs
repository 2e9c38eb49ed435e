//! Chat Widget
//!
//! Message history (persisted, capped), the open/close state machine, the
//! typing indicator and the window chrome that follows the viewport size.

use crate::storage::{KeyValueStore, CHAT_HISTORY_KEY};
use crate::types::AppResult;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Most recent messages kept in history
pub const MAX_HISTORY: usize = 50;

pub const FALLBACK_REPLY: &str = "Sorry, I could not understand your question.";
pub const ERROR_REPLY: &str = "An error occurred while processing your request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub message: String,
    /// Local time as displayed, e.g. "3:07:45 PM"
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(sender: Sender, message: impl Into<String>) -> Self {
        Self {
            sender,
            message: message.into(),
            timestamp: Local::now().format("%-I:%M:%S %p").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    /// Replay the persisted history. Nothing is written back.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(CHAT_HISTORY_KEY) else {
            return Self::default();
        };
        match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
            Ok(mut messages) => {
                let excess = messages.len().saturating_sub(MAX_HISTORY);
                messages.drain(..excess);
                debug!("Replayed {} chat messages", messages.len());
                Self { messages }
            }
            Err(e) => {
                warn!("Discarding unreadable chat history: {}", e);
                Self::default()
            }
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append, evict the oldest beyond the cap, persist. The message stays
    /// in the display when the write fails.
    pub fn push(&mut self, message: ChatMessage, store: &mut dyn KeyValueStore) -> AppResult<()> {
        self.messages.push(message);
        if self.messages.len() > MAX_HISTORY {
            let excess = self.messages.len() - MAX_HISTORY;
            self.messages.drain(..excess);
        }
        self.persist(store)
    }

    fn persist(&self, store: &mut dyn KeyValueStore) -> AppResult<()> {
        let json = serde_json::to_string(&self.messages)?;
        store.set(CHAT_HISTORY_KEY, &json).inspect_err(|e| {
            warn!("Failed to persist chat history: {}", e);
        })
    }

    /// Drop the display and the persisted copy. The display is cleared even
    /// when the key cannot be removed.
    pub fn clear(&mut self, store: &mut dyn KeyValueStore) -> AppResult<()> {
        self.messages.clear();
        store.remove(CHAT_HISTORY_KEY).inspect_err(|e| {
            warn!("Failed to remove chat history: {}", e);
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Closed,
    Open,
    /// Fading out; becomes `Closed` at `until`
    Closing { until: Instant },
}

/// Size and placement of the chat window, in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatChrome {
    pub visible: bool,
    pub full_width: bool,
    pub width: u16,
    pub max_height: u16,
    /// Offsets from the bottom-right corner
    pub right: u16,
    pub bottom: u16,
}

const WIDE_WIDTH: u16 = 40;
const WIDE_MAX_HEIGHT: u16 = 25;

impl ChatChrome {
    pub fn compute(columns: u16, rows: u16, open: bool, narrow_columns: u16) -> Self {
        if columns <= narrow_columns {
            Self {
                visible: open,
                full_width: true,
                width: columns,
                max_height: (rows as u32 * 8 / 10) as u16,
                right: 0,
                bottom: 0,
            }
        } else {
            Self {
                visible: open,
                full_width: false,
                width: WIDE_WIDTH.min(columns.saturating_sub(2)),
                max_height: WIDE_MAX_HEIGHT.min(rows.saturating_sub(2)),
                right: 2,
                bottom: 1,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatWidget {
    pub phase: ChatPhase,
    pub history: ChatHistory,
    /// Requests awaiting a reply; the typing indicator shows while non-zero
    pub pending_replies: usize,
    pub chrome: ChatChrome,
    close_delay: Duration,
    narrow_columns: u16,
    viewport: (u16, u16),
}

impl ChatWidget {
    pub fn new(history: ChatHistory, close_delay: Duration, narrow_columns: u16) -> Self {
        Self {
            phase: ChatPhase::Closed,
            history,
            pending_replies: 0,
            chrome: ChatChrome::compute(0, 0, false, narrow_columns),
            close_delay,
            narrow_columns,
            viewport: (0, 0),
        }
    }

    /// Open or closing counts as visible
    pub fn is_visible(&self) -> bool {
        !matches!(self.phase, ChatPhase::Closed)
    }

    pub fn is_open(&self) -> bool {
        self.phase == ChatPhase::Open
    }

    pub fn open(&mut self) {
        self.phase = ChatPhase::Open;
        self.refresh_chrome();
    }

    pub fn close(&mut self, now: Instant) {
        if self.phase == ChatPhase::Open {
            self.phase = ChatPhase::Closing {
                until: now + self.close_delay,
            };
        }
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_open() {
            self.close(now);
        } else {
            self.open();
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let ChatPhase::Closing { until } = self.phase {
            if now >= until {
                self.phase = ChatPhase::Closed;
                self.refresh_chrome();
            }
        }
    }

    pub fn is_typing(&self) -> bool {
        self.pending_replies > 0
    }

    pub fn begin_reply(&mut self) {
        self.pending_replies += 1;
    }

    pub fn finish_reply(&mut self) {
        self.pending_replies = self.pending_replies.saturating_sub(1);
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.viewport = (columns, rows);
        self.refresh_chrome();
    }

    fn refresh_chrome(&mut self) {
        let (columns, rows) = self.viewport;
        self.chrome = ChatChrome::compute(columns, rows, self.is_visible(), self.narrow_columns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::AppError;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }
        fn set(&mut self, _key: &str, _value: &str) -> AppResult<()> {
            Err(AppError::Storage("disk full".to_string()))
        }
        fn remove(&mut self, _key: &str) -> AppResult<()> {
            Err(AppError::Storage("disk full".to_string()))
        }
    }

    #[test]
    fn test_history_is_capped_oldest_first() {
        let mut store = MemoryStore::new();
        let mut history = ChatHistory::default();
        for i in 0..60 {
            history
                .push(ChatMessage::new(Sender::User, format!("m{}", i)), &mut store)
                .unwrap();
        }
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.messages()[0].message, "m10");
        assert_eq!(history.messages()[49].message, "m59");

        let persisted: Vec<ChatMessage> =
            serde_json::from_str(&store.get(CHAT_HISTORY_KEY).unwrap()).unwrap();
        assert_eq!(persisted.len(), MAX_HISTORY);
        assert_eq!(persisted[0].message, "m10");
        assert_eq!(persisted, history.messages());
    }

    #[test]
    fn test_wire_format() {
        let message = ChatMessage {
            sender: Sender::Bot,
            message: "hi".to_string(),
            timestamp: "3:07:45 PM".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sender": "bot", "message": "hi", "timestamp": "3:07:45 PM"})
        );
    }

    #[test]
    fn test_load_replays_without_saving() {
        let mut store = MemoryStore::new();
        let raw = r#"[{"sender":"user","message":"q","timestamp":"1:00:00 PM"},
                      {"sender":"bot","message":"a","timestamp":"1:00:01 PM"}]"#;
        store.set(CHAT_HISTORY_KEY, raw).unwrap();

        let history = ChatHistory::load(&store);
        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[1].sender, Sender::Bot);
        assert_eq!(store.get(CHAT_HISTORY_KEY).unwrap(), raw);
    }

    #[test]
    fn test_load_corrupt_history() {
        let mut store = MemoryStore::new();
        store.set(CHAT_HISTORY_KEY, "not json").unwrap();
        assert!(ChatHistory::load(&store).is_empty());
    }

    #[test]
    fn test_clear_removes_key_and_display() {
        let mut store = MemoryStore::new();
        let mut history = ChatHistory::default();
        history.push(ChatMessage::new(Sender::User, "q"), &mut store).unwrap();
        history.clear(&mut store).unwrap();
        assert!(history.is_empty());
        assert_eq!(store.get(CHAT_HISTORY_KEY), None);
    }

    #[test]
    fn test_failed_writes_are_returned_and_display_kept() {
        let mut store = FailingStore;
        let mut history = ChatHistory::default();

        let err = history
            .push(ChatMessage::new(Sender::User, "q"), &mut store)
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(history.len(), 1);

        assert!(history.clear(&mut store).is_err());
        assert!(history.is_empty());
    }

    #[test]
    fn test_open_close_cycle() {
        let start = Instant::now();
        let mut chat = ChatWidget::new(ChatHistory::default(), Duration::from_millis(300), 80);
        assert_eq!(chat.phase, ChatPhase::Closed);

        chat.toggle(start);
        assert!(chat.is_open());

        chat.toggle(start);
        assert!(chat.is_visible());
        assert!(!chat.is_open());

        chat.tick(start + Duration::from_millis(299));
        assert!(chat.is_visible());
        chat.tick(start + Duration::from_millis(300));
        assert_eq!(chat.phase, ChatPhase::Closed);
        assert!(!chat.chrome.visible);
    }

    #[test]
    fn test_chrome_follows_open_state_and_viewport() {
        let mut chat = ChatWidget::new(ChatHistory::default(), Duration::ZERO, 80);
        chat.resize(120, 40);
        assert!(!chat.chrome.visible);

        chat.open();
        assert!(chat.chrome.visible);
        assert!(!chat.chrome.full_width);

        chat.resize(70, 40);
        assert!(chat.chrome.full_width);
        assert_eq!(chat.chrome.width, 70);
    }

    #[test]
    fn test_typing_indicator_counts_pending_replies() {
        let mut chat = ChatWidget::new(ChatHistory::default(), Duration::ZERO, 80);
        chat.begin_reply();
        chat.begin_reply();
        chat.finish_reply();
        assert!(chat.is_typing());
        chat.finish_reply();
        chat.finish_reply();
        assert!(!chat.is_typing());
    }

    #[test]
    fn test_chrome_breakpoints() {
        let narrow = ChatChrome::compute(60, 40, true, 80);
        assert!(narrow.full_width);
        assert_eq!(narrow.width, 60);
        assert_eq!(narrow.max_height, 32);
        assert_eq!((narrow.right, narrow.bottom), (0, 0));

        let wide = ChatChrome::compute(120, 40, false, 80);
        assert!(!wide.full_width);
        assert!(!wide.visible);
        assert_eq!(wide.width, 40);
        assert_eq!(wide.max_height, 25);
    }
}
