//! Backend API
//!
//! The prioritization service is an external collaborator. This module
//! defines its contract (`Backend`) and the wire types; `client` holds the
//! reqwest implementation.

pub mod client;

pub use client::BackendClient;

use crate::config::ApiKey;
use crate::types::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A CSV file chosen for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One selectable row returned by `/upload`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub index: usize,
    pub title: String,
}

/// All fields of a single row, as returned by `/preview_request/{row}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewRow {
    pub fields: Vec<(String, String)>,
}

/// AI-generated analysis of a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub index: usize,
    pub title: String,
    pub directorate: String,
    /// Raw markdown as produced by the model
    pub markdown: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatQuery {
    pub query: String,
    pub analysis: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEmail {
    pub email: String,
    /// Base64-encoded PDF
    pub pdf: String,
}

/// Contract of the prioritization backend.
///
/// Maintenance and export calls take an `&ApiKey`; everything else sends the
/// configured key opportunistically.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn upload(&self, file: UploadFile) -> AppResult<Vec<RequestSummary>>;

    async fn preview_request(&self, row: usize) -> AppResult<PreviewRow>;

    async fn prioritize(&self, row: usize) -> AppResult<Analysis>;

    /// Returns the bot reply; an empty string means the backend had nothing to say
    async fn chat(&self, query: &ChatQuery) -> AppResult<String>;

    async fn clear_chat(&self, key: &ApiKey) -> AppResult<String>;

    async fn clear_analysis_cache(&self, key: &ApiKey) -> AppResult<String>;

    async fn send_report(&self, key: &ApiKey, report: &ReportEmail) -> AppResult<String>;
}

/// Render a loosely typed JSON value the way a browser would print it,
/// except that `null` becomes an empty string
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Wire types

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSummary {
    pub index: usize,
    #[serde(default)]
    pub title: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadBody {
    #[serde(default)]
    pub requests: Option<Vec<RawSummary>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PrioritizeBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub directorate: Value,
    #[serde(default)]
    pub analysis: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatBody {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}
