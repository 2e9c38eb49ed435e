// Shared error type

/// Optional capabilities an action may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ApiKey,
    PdfRenderer,
    Clipboard,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::ApiKey => write!(f, "API key"),
            Capability::PdfRenderer => write!(f, "PDF renderer"),
            Capability::Clipboard => write!(f, "clipboard"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response; `message` comes from the `{error}` body when present
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// 2xx response that still carried an `{error}` field
    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Markdown conversion failed: {0}")]
    Markup(String),

    #[error("{0} is not available")]
    MissingCapability(Capability),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
