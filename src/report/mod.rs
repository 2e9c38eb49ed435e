//! Analysis Report
//!
//! The results shown after an analysis: a heading, the directorate line, an
//! optional evaluator heading and the converted markdown body. The same
//! structure feeds the terminal view, the plain-text copy and the PDF.

pub mod export;
pub mod heatmap;
pub mod markup;

pub use heatmap::Rating;
pub use markup::{Block, Cell, Document, InlineStyle, ListItem, Span, Table};

use crate::api::Analysis;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub index: usize,
    pub title: String,
    pub directorate: String,
    pub evaluator: Option<String>,
    pub body: Document,
}

impl AnalysisReport {
    /// Convert the backend analysis, falling back to raw text when the
    /// markdown cannot be converted, then apply heat-map styling
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let mut body = markup::render_or_fallback(&analysis.markdown);
        heatmap::apply(&mut body);

        Self {
            index: analysis.index,
            title: analysis.title.clone(),
            directorate: analysis.directorate.clone(),
            evaluator: None,
            body,
        }
    }

    pub fn heading(&self) -> String {
        format!("Analysis for Row {}: {}", self.index, self.title)
    }

    pub fn directorate_line(&self) -> String {
        format!("Directorate: {}", self.directorate)
    }

    pub fn evaluator_heading(&self) -> Option<String> {
        self.evaluator
            .as_ref()
            .map(|name| format!("Evaluator: {}", name))
    }

    /// Insert or replace the single evaluator heading
    pub fn set_evaluator(&mut self, name: &str) {
        self.evaluator = Some(name.to_string());
    }

    /// Text lines in reading order, without styling
    pub fn plain_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(evaluator) = self.evaluator_heading() {
            lines.push(evaluator);
        }
        lines.push(self.heading());
        lines.push(self.directorate_line());
        lines.push(String::new());
        lines.extend(self.body.plain_lines());
        lines
    }

    pub fn to_plain_text(&self) -> String {
        self.plain_lines().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> Analysis {
        Analysis {
            index: 0,
            title: "Request A".to_string(),
            directorate: "IT".to_string(),
            markdown: "# Result\n\n| Category | Rating |\n|---|---|\n| Impact | Very High |\n"
                .to_string(),
        }
    }

    #[test]
    fn test_report_headings() {
        let report = AnalysisReport::from_analysis(&analysis());
        assert_eq!(report.heading(), "Analysis for Row 0: Request A");
        assert_eq!(report.directorate_line(), "Directorate: IT");
        assert_eq!(report.evaluator_heading(), None);
    }

    #[test]
    fn test_evaluator_is_single_and_first() {
        let mut report = AnalysisReport::from_analysis(&analysis());
        report.set_evaluator("Dana");
        report.set_evaluator("Sam");

        let lines = report.plain_lines();
        assert_eq!(lines[0], "Evaluator: Sam");
        assert_eq!(lines.iter().filter(|l| l.starts_with("Evaluator:")).count(), 1);
    }

    #[test]
    fn test_plain_text_contains_body() {
        let report = AnalysisReport::from_analysis(&analysis());
        let text = report.to_plain_text();
        assert!(text.contains("Analysis for Row 0: Request A"));
        assert!(text.contains("Result"));
        assert!(text.contains("Impact\tVery High"));
    }

    #[test]
    fn test_heat_map_applied_on_conversion() {
        let report = AnalysisReport::from_analysis(&analysis());
        let table = report.body.first_table().unwrap();
        assert_eq!(table.rows[0][1].rating, Some(Rating::VeryHigh));
    }
}
