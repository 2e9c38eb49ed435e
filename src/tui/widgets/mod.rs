//! TUI Widgets
//!
//! Custom widgets for the front-end.

mod chat;
mod notice;
mod progress;
mod report;

pub use chat::{chat_area, render_chat};
pub use notice::{render_spinner, render_toasts};
pub use progress::render_progress;
pub use report::{document_lines, preview_lines, report_lines};
