//! Key-Value Storage
//!
//! Flat string storage for the few values that outlive a session:
//! the theme, the chat history and the most recent analysis.

pub mod local;

pub use local::LocalStore;

use crate::types::AppResult;
use std::collections::BTreeMap;

/// Persisted theme, `"dark"` or `"light"`
pub const THEME_KEY: &str = "theme";
/// JSON array of chat messages
pub const CHAT_HISTORY_KEY: &str = "chatbotHistory";
/// Raw markdown of the last analysis, sent as chat context
pub const LATEST_ANALYSIS_KEY: &str = "latestAnalysis";

/// Minimal string store with local-storage semantics
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&mut self, key: &str) -> AppResult<()>;
}

/// In-memory store for `--ephemeral` runs and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
