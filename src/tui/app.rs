//! Application State
//!
//! The page controller: owns the view-model, dispatches user actions and
//! applies the results of backend calls as they arrive.

use crate::api::{
    Analysis, Backend, ChatQuery, PreviewRow, ReportEmail, RequestSummary, UploadFile,
};
use crate::config::Config;
use crate::page::chat::{ERROR_REPLY, FALLBACK_REPLY};
use crate::page::{
    ChatMessage, Page, PageLayout, Sender, ToastLevel, WizardStep, ANALYSIS_TAB, REPORT_TAB,
};
use crate::report::export::{self, ClipboardSink};
use crate::report::AnalysisReport;
use crate::storage::{KeyValueStore, LATEST_ANALYSIS_KEY};
use crate::tui::event::AppAction;
use crate::types::{AppError, AppResult, Capability};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tui_textarea::TextArea;

const NO_REPORT: &str = "No analysis to export yet.";
const NO_SELECTION: &str = "No request selected.";

const UPLOAD_SPINNER: &str = "Uploading CSV...";
const PREVIEW_SPINNER: &str = "Loading preview...";
const ANALYSIS_SPINNER: &str = "Retrieving analysis, please wait...";
const EMAIL_SPINNER: &str = "Sending email...";
const CACHE_SPINNER: &str = "Clearing analysis cache...";

/// Current view/screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Main,
    Help,
    /// Recipient prompt for emailing the report
    EmailPrompt,
}

/// Field receiving keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    FilePath,
    Requests,
    Evaluator,
    Chat,
    None,
}

/// Completions of backend calls
#[derive(Debug)]
pub enum AppEvent {
    UploadFinished(AppResult<Vec<RequestSummary>>),
    PreviewFinished(AppResult<PreviewRow>),
    AnalysisFinished(AppResult<Analysis>),
    ChatReplied(AppResult<String>),
    ChatCleared(AppResult<String>),
    AnalysisCacheCleared(AppResult<String>),
    ReportSent(AppResult<String>),
}

/// Main application state
pub struct App {
    pub config: Config,

    // UI State
    pub view: View,
    pub focus: Focus,
    pub should_quit: bool,
    pub page: Page,
    pub report_scroll: u16,
    pub frame_count: usize,

    // Inputs
    pub file_input: TextArea<'static>,
    pub evaluator_input: TextArea<'static>,
    pub chat_input: TextArea<'static>,
    pub email_input: TextArea<'static>,

    // Collaborators
    backend: Arc<dyn Backend>,
    store: Box<dyn KeyValueStore>,
    clipboard: Box<dyn ClipboardSink>,

    // Async communication
    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

fn text_input(placeholder: &str) -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(ratatui::style::Style::default());
    input.set_placeholder_text(placeholder);
    input
}

fn input_text(input: &TextArea<'_>) -> String {
    input.lines().join("\n").trim().to_string()
}

impl App {
    pub fn new(
        config: Config,
        backend: Arc<dyn Backend>,
        store: Box<dyn KeyValueStore>,
        clipboard: Box<dyn ClipboardSink>,
        viewport: (u16, u16),
    ) -> Self {
        let page = Page::build(&PageLayout::default(), &config.ui, store.as_ref(), viewport);
        let (event_tx, event_rx) = mpsc::channel(100);

        Self {
            config,
            view: View::Main,
            focus: Focus::FilePath,
            should_quit: false,
            page,
            report_scroll: 0,
            frame_count: 0,
            file_input: text_input("Path to a CSV file, then Enter"),
            evaluator_input: text_input("Evaluator name, then Enter"),
            chat_input: text_input("Ask about the analysis..."),
            email_input: text_input("recipient@example.com"),
            backend,
            store,
            clipboard,
            event_rx,
            event_tx,
        }
    }

    fn notify(&mut self, message: impl Into<String>, level: ToastLevel) {
        self.page.notify(message, level, Instant::now());
    }

    fn notify_error(&mut self, message: impl Into<String>) {
        self.notify(message, ToastLevel::Error);
    }

    /// The session keeps the new state; only the persisted copy is stale
    fn save_failed(&mut self, what: &str, e: AppError) {
        self.notify_error(format!("Could not save {}: {}", what, e));
    }

    pub fn has_api_key(&self) -> bool {
        self.config.backend.api_key.is_some()
    }

    // === View state ===

    /// Activate tab `name` and link `link_index`; unknown names change nothing
    pub fn open_tab(&mut self, link_index: usize, name: &str) -> bool {
        let opened = self.page.tabs.open_tab(link_index, name, Instant::now());
        if opened {
            self.reset_focus();
        }
        opened
    }

    pub fn toggle_dark_mode(&mut self) {
        let saved = self.page.appearance.toggle_dark_mode(self.store.as_mut());
        self.notify(self.page.appearance.mode.notice(), ToastLevel::Info);
        if let Err(e) = saved {
            self.save_failed("theme", e);
        }
    }

    pub fn set_step(&mut self, n: usize) -> bool {
        self.page.set_step(n)
    }

    fn set_wizard(&mut self, step: WizardStep) {
        self.page.set_step(step.number());
    }

    /// Fields reachable with Tab on the current tab
    pub fn focus_ring(&self) -> Vec<Focus> {
        let mut ring = match self.page.tabs.active_name() {
            Some(ANALYSIS_TAB) => vec![Focus::FilePath, Focus::Requests],
            Some(REPORT_TAB) if self.page.workflow.evaluator_visible => vec![Focus::Evaluator],
            _ => Vec::new(),
        };
        if self.page.chat.as_ref().is_some_and(|c| c.is_open()) {
            ring.push(Focus::Chat);
        }
        ring
    }

    fn reset_focus(&mut self) {
        let ring = self.focus_ring();
        if !ring.contains(&self.focus) {
            self.focus = ring.first().copied().unwrap_or(Focus::None);
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let ring = self.focus_ring();
        if ring.is_empty() {
            self.focus = Focus::None;
            return;
        }
        let next = match ring.iter().position(|f| *f == self.focus) {
            Some(i) if forward => (i + 1) % ring.len(),
            Some(i) => (i + ring.len() - 1) % ring.len(),
            None => 0,
        };
        self.focus = ring[next];
    }

    // === Chat ===

    pub fn toggle_chat(&mut self) {
        let Some(chat) = self.page.chat.as_mut() else {
            return;
        };
        chat.toggle(Instant::now());
        if chat.is_open() {
            self.focus = Focus::Chat;
        } else {
            self.reset_focus();
        }
    }

    pub fn close_chat(&mut self) {
        if let Some(chat) = self.page.chat.as_mut() {
            chat.close(Instant::now());
        }
        self.reset_focus();
    }

    /// Append the query right away, then ask the backend with the latest
    /// analysis as context
    pub fn send_chat_message(&mut self) {
        let query = input_text(&self.chat_input);
        if query.is_empty() {
            return;
        }
        let Some(chat) = self.page.chat.as_mut() else {
            return;
        };

        let saved = chat
            .history
            .push(ChatMessage::new(Sender::User, query.clone()), self.store.as_mut());
        chat.begin_reply();
        self.chat_input = text_input("Ask about the analysis...");
        if let Err(e) = saved {
            self.save_failed("chat history", e);
        }

        let analysis = self.store.get(LATEST_ANALYSIS_KEY).unwrap_or_default();
        let backend = self.backend.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.chat(&ChatQuery { query, analysis }).await;
            tx.send(AppEvent::ChatReplied(result)).await.ok();
        });
    }

    /// Local history is wiped first; the remote clear cannot undo that
    pub fn clear_chat_history(&mut self) {
        if let Some(chat) = self.page.chat.as_mut() {
            if let Err(e) = chat.history.clear(self.store.as_mut()) {
                self.save_failed("chat history", e);
            }
        }

        let Some(key) = self.config.backend.api_key.clone() else {
            self.notify_error(AppError::MissingCapability(Capability::ApiKey).to_string());
            return;
        };
        let backend = self.backend.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.clear_chat(&key).await;
            tx.send(AppEvent::ChatCleared(result)).await.ok();
        });
    }

    // === Upload & analysis ===

    /// Read and upload the chosen file
    pub async fn upload_csv(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            self.notify_error("Please select a CSV file first!");
            return;
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Cannot read {}: {}", path, e);
                self.notify_error(format!("Cannot read {}: {}", path, e));
                return;
            }
        };
        if bytes.is_empty() {
            self.notify_error("The selected file is empty.");
            return;
        }

        let file_name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        info!("Uploading {} ({} bytes)", file_name, bytes.len());

        self.page.workflow.begin_upload(file_name.clone());
        self.page.spinner.show(UPLOAD_SPINNER);

        let backend = self.backend.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.upload(UploadFile { file_name, bytes }).await;
            tx.send(AppEvent::UploadFinished(result)).await.ok();
        });
    }

    pub fn preview_selected_request(&mut self) {
        let Some(row) = self.page.workflow.selected_row() else {
            self.notify_error(NO_SELECTION);
            return;
        };
        self.page.workflow.begin_preview();
        self.page.spinner.show(PREVIEW_SPINNER);

        let backend = self.backend.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.preview_request(row).await;
            tx.send(AppEvent::PreviewFinished(result)).await.ok();
        });
    }

    pub fn get_single_analysis(&mut self) {
        let Some(row) = self.page.workflow.selected_row() else {
            self.notify_error(NO_SELECTION);
            return;
        };
        self.page.workflow.begin_analysis();
        self.page.spinner.show(ANALYSIS_SPINNER);

        let backend = self.backend.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.prioritize(row).await;
            tx.send(AppEvent::AnalysisFinished(result)).await.ok();
        });
    }

    pub fn add_evaluator_name(&mut self) {
        let name = input_text(&self.evaluator_input);
        if name.is_empty() {
            self.notify_error("Please enter a name.");
            return;
        }
        let Some(report) = self.page.workflow.report.as_mut() else {
            self.notify_error(NO_REPORT);
            return;
        };
        report.set_evaluator(&name);
        self.notify("Name added to report", ToastLevel::Success);
    }

    // === Export ===

    fn current_report(&mut self) -> Option<AnalysisReport> {
        let report = self.page.workflow.report.clone();
        if report.is_none() {
            self.notify_error(NO_REPORT);
        }
        report
    }

    pub async fn download_report(&mut self) {
        let Some(report) = self.current_report() else {
            return;
        };
        let result = match export::render_pdf(&report) {
            Ok(bytes) => export::save_pdf(&bytes, &self.config.export).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(path) => self.notify(
                format!("Report saved to {}", path.display()),
                ToastLevel::Success,
            ),
            Err(e) => {
                error!("PDF export failed: {}", e);
                self.notify_error(format!("Error: {}", e));
            }
        }
    }

    pub fn copy_report(&mut self) {
        let Some(report) = self.current_report() else {
            return;
        };
        match self.clipboard.set_text(&report.to_plain_text()) {
            Ok(()) => self.notify("Report copied to clipboard", ToastLevel::Success),
            Err(e) => {
                warn!("Copy failed: {}", e);
                self.notify_error("Copy failed");
            }
        }
    }

    /// Ask for the recipient. No prompt without a renderer for the attachment.
    pub fn email_report(&mut self) {
        if self.current_report().is_none() {
            return;
        }
        if !export::pdf_available() {
            self.notify_error(AppError::MissingCapability(Capability::PdfRenderer).to_string());
            return;
        }
        self.email_input = text_input("recipient@example.com");
        self.view = View::EmailPrompt;
    }

    /// Validate, render and send. Nothing reaches the network unless the
    /// address, the PDF and the API key are all available.
    pub fn submit_email(&mut self) {
        self.view = View::Main;

        let email = match export::validate_email(&input_text(&self.email_input)) {
            Ok(email) => email,
            Err(e) => {
                self.notify_error(e.to_string());
                return;
            }
        };
        let Some(report) = self.current_report() else {
            return;
        };
        let Some(key) = self.config.backend.api_key.clone() else {
            self.notify_error(AppError::MissingCapability(Capability::ApiKey).to_string());
            return;
        };
        let pdf = match export::render_pdf_base64(&report) {
            Ok(pdf) => pdf,
            Err(e) => {
                error!("PDF export failed: {}", e);
                self.notify_error(format!("Error: {}", e));
                return;
            }
        };

        self.page.spinner.show(EMAIL_SPINNER);
        let backend = self.backend.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.send_report(&key, &ReportEmail { email, pdf }).await;
            tx.send(AppEvent::ReportSent(result)).await.ok();
        });
    }

    pub fn clear_analysis_cache(&mut self) {
        let Some(key) = self.config.backend.api_key.clone() else {
            self.notify_error(AppError::MissingCapability(Capability::ApiKey).to_string());
            return;
        };
        self.page.spinner.show(CACHE_SPINNER);

        let backend = self.backend.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.clear_analysis_cache(&key).await;
            tx.send(AppEvent::AnalysisCacheCleared(result)).await.ok();
        });
    }

    // === Event loop plumbing ===

    pub fn tick(&mut self, now: Instant) {
        self.frame_count = self.frame_count.wrapping_add(1);
        self.page.tick(now);
        if self.focus == Focus::Chat && !self.page.chat.as_ref().is_some_and(|c| c.is_open()) {
            self.reset_focus();
        }
    }

    /// Poll for completed backend calls
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Wait for one backend completion and apply it
    pub async fn next_event(&mut self) -> bool {
        match self.event_rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply a completion; results are applied in arrival order
    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::UploadFinished(result) => {
                self.page.spinner.hide(UPLOAD_SPINNER);
                match result {
                    Ok(rows) if !rows.is_empty() => {
                        info!("Upload returned {} requests", rows.len());
                        self.page.workflow.upload_succeeded(rows);
                        self.set_wizard(WizardStep::Select);
                        self.focus = Focus::Requests;
                        self.notify("CSV uploaded successfully", ToastLevel::Success);
                    }
                    Ok(_) => self.upload_failed(AppError::Rejected(
                        "No rows found in the CSV.".to_string(),
                    )),
                    Err(e) => self.upload_failed(e),
                }
            }
            AppEvent::PreviewFinished(result) => {
                self.page.spinner.hide(PREVIEW_SPINNER);
                match result {
                    Ok(preview) => {
                        self.page.workflow.preview_succeeded(preview);
                        self.notify("Preview loaded", ToastLevel::Success);
                    }
                    Err(e) => {
                        warn!("Preview failed: {}", e);
                        self.page.workflow.preview_failed();
                        self.notify_error(format!("Error: {}", e));
                    }
                }
            }
            AppEvent::AnalysisFinished(result) => {
                self.page.spinner.hide(ANALYSIS_SPINNER);
                match result {
                    Ok(analysis) => self.analysis_ready(analysis),
                    Err(e) => {
                        warn!("Analysis failed: {}", e);
                        self.page.workflow.analysis_failed();
                        self.set_wizard(WizardStep::Select);
                        self.notify_error(format!("Error: {}", e));
                    }
                }
            }
            AppEvent::ChatReplied(result) => {
                let reply = match result {
                    Ok(reply) if reply.trim().is_empty() => FALLBACK_REPLY.to_string(),
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!("Chat request failed: {}", e);
                        ERROR_REPLY.to_string()
                    }
                };
                if let Some(chat) = self.page.chat.as_mut() {
                    chat.finish_reply();
                    let saved = chat
                        .history
                        .push(ChatMessage::new(Sender::Bot, reply), self.store.as_mut());
                    if let Err(e) = saved {
                        self.save_failed("chat history", e);
                    }
                }
            }
            AppEvent::ChatCleared(result) => match result {
                Ok(message) => self.notify(message, ToastLevel::Success),
                Err(e) => {
                    warn!("Remote chat clear failed: {}", e);
                    self.notify_error("An error occurred while clearing chat history");
                }
            },
            AppEvent::AnalysisCacheCleared(result) => {
                self.page.spinner.hide(CACHE_SPINNER);
                match result {
                    Ok(message) => self.notify(message, ToastLevel::Success),
                    Err(e) => {
                        warn!("Analysis cache clear failed: {}", e);
                        self.notify_error("An error occurred while clearing analysis cache");
                    }
                }
            }
            AppEvent::ReportSent(result) => {
                self.page.spinner.hide(EMAIL_SPINNER);
                match result {
                    Ok(message) => self.notify(message, ToastLevel::Success),
                    Err(e) => {
                        warn!("Sending report failed: {}", e);
                        self.notify_error(format!("Error: {}", e));
                    }
                }
            }
        }
    }

    fn upload_failed(&mut self, e: AppError) {
        warn!("Upload failed: {}", e);
        self.page.workflow.upload_failed();
        self.set_wizard(WizardStep::Upload);
        self.notify_error(format!("Upload failed: {}", e));
    }

    fn analysis_ready(&mut self, analysis: Analysis) {
        if let Err(e) = self.store.set(LATEST_ANALYSIS_KEY, &analysis.markdown) {
            warn!("Failed to store latest analysis: {}", e);
            self.save_failed("analysis for chat context", e);
        }
        let report = AnalysisReport::from_analysis(&analysis);
        info!("Analysis ready for row {}", report.index);

        self.page.workflow.analysis_succeeded(report);
        self.report_scroll = 0;
        self.set_wizard(WizardStep::Complete);
        self.notify("Analysis retrieved successfully", ToastLevel::Success);
    }

    // === Input ===

    /// Handle a user action
    pub async fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit | AppAction::ForceQuit => self.should_quit = true,
            AppAction::Resize(columns, rows) => {
                self.page.request_resize(columns, rows, Instant::now());
            }
            AppAction::Tick => self.tick(Instant::now()),
            _ if self.view == View::Help => self.view = View::Main,
            AppAction::ToggleHelp => self.view = View::Help,
            AppAction::Escape => {
                if self.view == View::EmailPrompt {
                    self.view = View::Main;
                } else if self.page.chat.as_ref().is_some_and(|c| c.is_open()) {
                    self.close_chat();
                }
            }
            AppAction::Submit => self.submit().await,
            AppAction::Input(key) => self.handle_input(key),
            _ if self.view == View::EmailPrompt => {}
            AppAction::NextFocus => self.cycle_focus(true),
            AppAction::PrevFocus => self.cycle_focus(false),
            AppAction::OpenTab(index) => {
                if let Some(name) = self.page.tabs.links.get(index).map(|l| l.target) {
                    self.open_tab(index, name);
                }
            }
            AppAction::ToggleTheme => self.toggle_dark_mode(),
            AppAction::ToggleChat => self.toggle_chat(),
            AppAction::ClearChat => self.clear_chat_history(),
            AppAction::Preview => self.preview_selected_request(),
            AppAction::Analyze => self.get_single_analysis(),
            AppAction::Download => self.download_report().await,
            AppAction::Copy => self.copy_report(),
            AppAction::Email => self.email_report(),
            AppAction::ClearCache => self.clear_analysis_cache(),
            AppAction::Up => self.move_selection(-1),
            AppAction::Down => self.move_selection(1),
            AppAction::PageUp => self.move_selection(-10),
            AppAction::PageDown => self.move_selection(10),
        }
    }

    async fn submit(&mut self) {
        if self.view == View::EmailPrompt {
            self.submit_email();
            return;
        }
        match self.focus {
            Focus::FilePath => {
                let path = input_text(&self.file_input);
                self.upload_csv(&path).await;
            }
            Focus::Requests => self.preview_selected_request(),
            Focus::Evaluator => self.add_evaluator_name(),
            Focus::Chat => self.send_chat_message(),
            Focus::None => {}
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if self.focus == Focus::Requests {
            for _ in 0..delta.unsigned_abs() {
                if delta < 0 {
                    self.page.workflow.select_previous();
                } else {
                    self.page.workflow.select_next();
                }
            }
        } else if self.page.tabs.active_name() == Some(REPORT_TAB) {
            self.report_scroll = if delta < 0 {
                self.report_scroll.saturating_sub(delta.unsigned_abs() as u16)
            } else {
                self.report_scroll.saturating_add(delta as u16)
            };
        }
    }

    fn handle_input(&mut self, key: crossterm::event::KeyEvent) {
        if self.view == View::EmailPrompt {
            self.email_input.input(key);
            return;
        }
        match self.focus {
            Focus::FilePath => {
                self.file_input.input(key);
            }
            Focus::Evaluator => {
                self.evaluator_input.input(key);
            }
            Focus::Chat => {
                self.chat_input.input(key);
            }
            Focus::Requests | Focus::None => {}
        }
    }
}
