//! Progress Widget
//!
//! Displays the step wizard: indicators plus a progress gauge.

use crate::page::StepWizard;
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// State of one wizard indicator relative to the active step
#[derive(Debug, Clone, Copy, PartialEq)]
enum StepState {
    Pending,
    Active,
    Complete,
}

impl StepState {
    fn of(index: usize, current: Option<usize>) -> Self {
        match current {
            Some(step) if index + 1 < step => StepState::Complete,
            Some(step) if index + 1 == step => StepState::Active,
            _ => StepState::Pending,
        }
    }
}

/// Render the wizard
pub fn render_progress(frame: &mut Frame, area: Rect, wizard: &StepWizard, theme: &Theme) {
    let block = Block::default()
        .title(" Progress ")
        .borders(Borders::ALL)
        .border_style(theme.border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    frame.render_widget(Paragraph::new(Line::from(step_spans(wizard, theme))), rows[0]);

    let gauge = Gauge::default()
        .gauge_style(theme.complete())
        .ratio((wizard.progress / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", wizard.progress));
    frame.render_widget(gauge, rows[1]);
}

fn step_spans(wizard: &StepWizard, theme: &Theme) -> Vec<Span<'static>> {
    let current = wizard.current();
    let mut spans = Vec::new();

    for (i, indicator) in wizard.indicators.iter().enumerate() {
        let (icon, style) = match StepState::of(i, current) {
            StepState::Complete => (Icons::COMPLETE, theme.complete()),
            StepState::Active => (Icons::ACTIVE, theme.active()),
            StepState::Pending => (Icons::PENDING, theme.pending()),
        };

        spans.push(Span::styled(format!("{} {}. ", icon, i + 1), style));
        spans.push(Span::styled(indicator.label.to_string(), style));

        if i + 1 < wizard.indicators.len() {
            spans.push(Span::styled(format!(" {} ", Icons::ARROW), theme.text_dim()));
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_states() {
        assert_eq!(StepState::of(0, Some(2)), StepState::Complete);
        assert_eq!(StepState::of(1, Some(2)), StepState::Active);
        assert_eq!(StepState::of(2, Some(2)), StepState::Pending);
        assert_eq!(StepState::of(0, None), StepState::Pending);
    }

    #[test]
    fn test_step_spans_mark_active_step() {
        let mut wizard = StepWizard::default();
        wizard.set_step_number(2);
        let text: String = step_spans(&wizard, &crate::tui::theme::DARK)
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("✓ 1. Upload"));
        assert!(text.contains("● 2. Select & Preview"));
        assert!(text.contains("○ 3. Analysis"));
    }
}
