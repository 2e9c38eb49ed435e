//! Toasts and the spinner overlay

use crate::page::{Spinner, ToastLevel, ToastPhase, ToastQueue};
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 3;

/// Stack toasts in the top-right corner, newest at the bottom
pub fn render_toasts(frame: &mut Frame, toasts: &ToastQueue, theme: &Theme, now: Instant) {
    let screen = frame.area();
    let width = TOAST_WIDTH.min(screen.width);
    let x = screen.x + screen.width.saturating_sub(width + 1);

    for (i, (toast, phase)) in toasts.visible(now).into_iter().enumerate() {
        let y = screen.y + 1 + i as u16 * TOAST_HEIGHT;
        if y + TOAST_HEIGHT > screen.y + screen.height {
            break;
        }
        let area = Rect::new(x, y, width, TOAST_HEIGHT);

        let mut style = match toast.level {
            ToastLevel::Info => theme.title(),
            ToastLevel::Success => theme.success(),
            ToastLevel::Error => theme.error(),
        };
        if phase != ToastPhase::Showing {
            style = style.add_modifier(Modifier::DIM);
        }

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(toast.message.clone(), style)))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(style)
                        .style(theme.surface()),
                )
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

/// Centered box with the newest spinner message
pub fn render_spinner(frame: &mut Frame, spinner: &Spinner, theme: &Theme, frame_count: usize) {
    let Some(message) = spinner.message() else {
        return;
    };
    let screen = frame.area();
    let width = (message.chars().count() as u16 + 8).min(screen.width);
    let area = Rect::new(
        screen.x + screen.width.saturating_sub(width) / 2,
        screen.y + screen.height.saturating_sub(3) / 2,
        width,
        3.min(screen.height),
    );
    let icon = Icons::SPINNER[(frame_count / 2) % Icons::SPINNER.len()];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", icon), theme.active()),
            Span::styled(message.to_string(), theme.text()),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_focused())
                .style(theme.surface()),
        ),
        area,
    );
}
