use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// API key capability.
///
/// Backend calls that require authentication take an `&ApiKey`, so the only
/// way to issue them is to hold one. The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for a blank key so an empty env var means "not configured"
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let start = self
            .0
            .char_indices()
            .rev()
            .nth(3)
            .map_or(0, |(i, _)| i);
        write!(f, "ApiKey(••••{})", &self.0[start..])
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub export: ExportConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: Option<ApiKey>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub directory: PathBuf,
    pub pdf_filename: String,
}

/// Timings and breakpoints of the page chrome
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub tab_transition: Duration,
    pub chat_close_delay: Duration,
    pub resize_debounce: Duration,
    pub toast_enter: Duration,
    pub toast_show: Duration,
    pub toast_fade: Duration,
    pub tick_rate: Duration,
    /// Viewports at or below this width get the full-width chat window
    pub narrow_columns: u16,
    /// Viewports at or below this width render tables as cards
    pub table_card_columns: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tab_transition: Duration::from_millis(300),
            chat_close_delay: Duration::from_millis(300),
            resize_debounce: Duration::from_millis(250),
            toast_enter: Duration::from_millis(100),
            toast_show: Duration::from_millis(3000),
            toast_fade: Duration::from_millis(500),
            tick_rate: Duration::from_millis(100),
            narrow_columns: 80,
            table_card_columns: 100,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aiprio")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
                api_key: None,
                request_timeout: Duration::from_secs(180),
            },
            storage: StorageConfig {
                data_dir: default_data_dir(),
            },
            export: ExportConfig {
                directory: PathBuf::from("."),
                pdf_filename: "analysis_report.pdf".to_string(),
            },
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();
        let ui_defaults = UiConfig::default();

        Ok(Self {
            backend: BackendConfig {
                base_url: env::var("AIPRIO_BACKEND_URL")
                    .unwrap_or(defaults.backend.base_url)
                    .trim_end_matches('/')
                    .to_string(),
                api_key: env::var("AIPRIO_API_KEY").ok().and_then(ApiKey::new),
                request_timeout: Duration::from_secs(
                    env::var("AIPRIO_REQUEST_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "180".to_string())
                        .parse()?,
                ),
            },
            storage: StorageConfig {
                data_dir: env::var("AIPRIO_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.data_dir),
            },
            export: ExportConfig {
                directory: env::var("AIPRIO_EXPORT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.export.directory),
                pdf_filename: defaults.export.pdf_filename,
            },
            ui: UiConfig {
                tab_transition: Duration::from_millis(
                    env::var("AIPRIO_TAB_TRANSITION_MS")
                        .unwrap_or_else(|_| "300".to_string())
                        .parse()?,
                ),
                narrow_columns: env::var("AIPRIO_NARROW_COLUMNS")
                    .unwrap_or_else(|_| "80".to_string())
                    .parse()?,
                table_card_columns: env::var("AIPRIO_TABLE_CARD_COLUMNS")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()?,
                ..ui_defaults
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_api_key_is_not_a_capability() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert_eq!(ApiKey::new(" abc ").unwrap().expose(), "abc");
    }

    #[test]
    fn test_api_key_debug_is_masked() {
        let key = ApiKey::new("super-secret-1234").unwrap();
        let shown = format!("{:?}", key);
        assert!(!shown.contains("super-secret"));
        assert!(shown.ends_with("1234)"));
    }

    #[test]
    fn test_api_key_debug_keeps_multibyte_tail_whole() {
        assert_eq!(format!("{:?}", ApiKey::new("€abc").unwrap()), "ApiKey(••••€abc)");
        assert_eq!(format!("{:?}", ApiKey::new("x€€€€").unwrap()), "ApiKey(••••€€€€)");
        assert_eq!(format!("{:?}", ApiKey::new("é").unwrap()), "ApiKey(••••é)");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.export.pdf_filename, "analysis_report.pdf");
        assert_eq!(config.ui.resize_debounce, Duration::from_millis(250));
        assert_eq!(config.ui.toast_show, Duration::from_millis(3000));
        assert!(config.storage.log_dir().ends_with("logs"));
    }
}
