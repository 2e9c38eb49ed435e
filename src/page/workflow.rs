//! Upload and analysis workflow state

use crate::api::{PreviewRow, RequestSummary};
use crate::report::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Uploading,
    ReadyToSelect,
    Previewing,
    Analyzing,
    AnalysisReady,
}

/// One entry of the request selection list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOption {
    pub index: usize,
    pub title: String,
}

impl RequestOption {
    pub fn label(&self) -> String {
        format!("Row {} - {}", self.index, self.title)
    }
}

impl From<RequestSummary> for RequestOption {
    fn from(summary: RequestSummary) -> Self {
        Self {
            index: summary.index,
            title: summary.title,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workflow {
    pub state: WorkflowState,
    /// Name of the file last chosen for upload
    pub selected_file: Option<String>,
    pub options: Vec<RequestOption>,
    /// Position in `options`
    pub selected: Option<usize>,
    pub preview: Option<PreviewRow>,
    pub report: Option<AnalysisReport>,
    pub evaluator_visible: bool,
}

impl Workflow {
    /// Backend row index of the selected option
    pub fn selected_row(&self) -> Option<usize> {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(|option| option.index)
    }

    pub fn select_next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1).min(self.options.len() - 1),
            None => 0,
        });
    }

    pub fn select_previous(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    /// State to return to once an operation finishes
    fn settle(&mut self) {
        self.state = if self.report.is_some() {
            WorkflowState::AnalysisReady
        } else if !self.options.is_empty() {
            WorkflowState::ReadyToSelect
        } else {
            WorkflowState::Idle
        };
    }

    pub fn begin_upload(&mut self, file_name: impl Into<String>) {
        self.selected_file = Some(file_name.into());
        self.state = WorkflowState::Uploading;
    }

    /// Replace the selection list wholesale
    pub fn upload_succeeded(&mut self, rows: Vec<RequestSummary>) {
        self.options = rows.into_iter().map(RequestOption::from).collect();
        self.selected = if self.options.is_empty() { None } else { Some(0) };
        self.state = WorkflowState::ReadyToSelect;
    }

    pub fn upload_failed(&mut self) {
        self.state = if self.options.is_empty() {
            WorkflowState::Idle
        } else {
            WorkflowState::ReadyToSelect
        };
    }

    pub fn begin_preview(&mut self) {
        self.state = WorkflowState::Previewing;
    }

    pub fn preview_succeeded(&mut self, preview: PreviewRow) {
        self.preview = Some(preview);
        self.settle();
    }

    /// The previous preview, if any, stays in place
    pub fn preview_failed(&mut self) {
        self.settle();
    }

    pub fn begin_analysis(&mut self) {
        self.state = WorkflowState::Analyzing;
    }

    pub fn analysis_succeeded(&mut self, report: AnalysisReport) {
        self.report = Some(report);
        self.evaluator_visible = true;
        self.state = WorkflowState::AnalysisReady;
    }

    pub fn analysis_failed(&mut self) {
        self.settle();
    }
}
