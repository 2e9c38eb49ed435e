//! Light/dark theme state

use crate::storage::{KeyValueStore, THEME_KEY};
use crate::types::AppResult;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Anything other than "dark" is light
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => ThemeMode::Dark,
            _ => ThemeMode::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }

    pub fn notice(self) -> &'static str {
        match self {
            ThemeMode::Dark => "Dark Mode Enabled",
            ThemeMode::Light => "Light Mode Enabled",
        }
    }
}

/// Mode applied to each themed surface. Chat surfaces are `None` when the
/// page has no chat widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appearance {
    pub mode: ThemeMode,
    pub root: ThemeMode,
    pub body: ThemeMode,
    pub chat_toggle: Option<ThemeMode>,
    pub chat_container: Option<ThemeMode>,
}

impl Appearance {
    pub fn new(has_chat: bool) -> Self {
        let mode = ThemeMode::default();
        Self {
            mode,
            root: mode,
            body: mode,
            chat_toggle: has_chat.then_some(mode),
            chat_container: has_chat.then_some(mode),
        }
    }

    fn apply(&mut self, mode: ThemeMode) {
        self.mode = mode;
        self.root = mode;
        self.body = mode;
        if let Some(toggle) = self.chat_toggle.as_mut() {
            *toggle = mode;
        }
        if let Some(container) = self.chat_container.as_mut() {
            *container = mode;
        }
    }

    /// Apply the persisted theme. Safe to call any number of times.
    pub fn init_theme(&mut self, store: &dyn KeyValueStore) {
        let mode = ThemeMode::from_stored(store.get(THEME_KEY).as_deref());
        self.apply(mode);
        debug!("Theme initialized: {}", mode.as_str());
    }

    /// Flip and persist the theme. The new theme applies for this session
    /// even when the write fails.
    pub fn toggle_dark_mode(&mut self, store: &mut dyn KeyValueStore) -> AppResult<ThemeMode> {
        let mode = self.mode.toggled();
        self.apply(mode);
        store.set(THEME_KEY, mode.as_str()).inspect_err(|e| {
            warn!("Failed to persist theme: {}", e);
        })?;
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults_to_light() {
        let store = MemoryStore::default();
        let mut appearance = Appearance::new(true);
        appearance.init_theme(&store);
        assert_eq!(appearance.mode, ThemeMode::Light);
        assert_eq!(ThemeMode::from_stored(Some("sepia")), ThemeMode::Light);
    }

    #[test]
    fn test_init_applies_persisted_theme_everywhere() {
        let mut store = MemoryStore::default();
        store.set(THEME_KEY, "dark").unwrap();

        let mut appearance = Appearance::new(true);
        appearance.init_theme(&store);
        appearance.init_theme(&store);

        assert_eq!(appearance.root, ThemeMode::Dark);
        assert_eq!(appearance.body, ThemeMode::Dark);
        assert_eq!(appearance.chat_toggle, Some(ThemeMode::Dark));
        assert_eq!(appearance.chat_container, Some(ThemeMode::Dark));
    }

    #[test]
    fn test_missing_chat_is_skipped() {
        let mut store = MemoryStore::default();
        store.set(THEME_KEY, "dark").unwrap();

        let mut appearance = Appearance::new(false);
        appearance.init_theme(&store);
        assert_eq!(appearance.body, ThemeMode::Dark);
        assert_eq!(appearance.chat_toggle, None);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut store = MemoryStore::default();
        let mut appearance = Appearance::new(true);
        appearance.init_theme(&store);
        let before = appearance.clone();

        assert_eq!(appearance.toggle_dark_mode(&mut store).unwrap(), ThemeMode::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(appearance.chat_container, Some(ThemeMode::Dark));

        assert_eq!(appearance.toggle_dark_mode(&mut store).unwrap(), ThemeMode::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(appearance, before);
    }

    #[test]
    fn test_failed_persist_still_applies_theme() {
        struct ReadOnlyStore;
        impl KeyValueStore for ReadOnlyStore {
            fn get(&self, _key: &str) -> Option<String> {
                None
            }
            fn set(&mut self, _key: &str, _value: &str) -> AppResult<()> {
                Err(crate::types::AppError::Storage("read-only".to_string()))
            }
            fn remove(&mut self, _key: &str) -> AppResult<()> {
                Ok(())
            }
        }

        let mut appearance = Appearance::new(true);
        assert!(appearance.toggle_dark_mode(&mut ReadOnlyStore).is_err());
        assert_eq!(appearance.mode, ThemeMode::Dark);
        assert_eq!(appearance.body, ThemeMode::Dark);
    }

    #[test]
    fn test_notice_text() {
        assert_eq!(ThemeMode::Dark.notice(), "Dark Mode Enabled");
        assert_eq!(ThemeMode::Light.notice(), "Light Mode Enabled");
    }
}
