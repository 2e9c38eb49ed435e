// AiPrio - terminal front-end for AI-assisted request prioritization

pub mod api;
pub mod config;
pub mod page;
pub mod report;
pub mod storage;
pub mod tui;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use types::{AppError, AppResult};
