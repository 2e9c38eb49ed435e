//! Chat Widget
//!
//! Floating chat window anchored to the bottom-right corner, or spanning
//! the bottom of narrow screens.

use crate::page::{ChatChrome, ChatWidget, Sender};
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_textarea::TextArea;

/// Where the chat window lands on screen
pub fn chat_area(chrome: &ChatChrome, screen: Rect) -> Rect {
    let width = chrome.width.min(screen.width);
    let height = chrome.max_height.min(screen.height).max(6.min(screen.height));
    let x = screen.x + screen.width.saturating_sub(width + chrome.right);
    let y = screen.y + screen.height.saturating_sub(height + chrome.bottom);
    Rect::new(x, y, width, height)
}

pub fn render_chat(
    frame: &mut Frame,
    chat: &ChatWidget,
    input: &TextArea<'static>,
    theme: &Theme,
    focused: bool,
    fading: bool,
) {
    if !chat.chrome.visible {
        return;
    }
    let area = chat_area(&chat.chrome, frame.area());
    frame.render_widget(Clear, area);

    let mut border = theme.border_for(focused);
    if fading {
        border = border.add_modifier(Modifier::DIM);
    }
    let block = Block::default()
        .title(" Assistant ")
        .title_bottom(Line::from(" Ctrl+L clear · Esc close ").right_aligned())
        .borders(Borders::ALL)
        .border_style(border)
        .style(theme.surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let lines = message_lines(chat, theme);
    // Keep the newest messages in view
    let visible = chunks[0].height as usize;
    let width = inner.width.max(1) as usize;
    let wrapped_estimate: usize = lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(width))
        .sum();
    let scroll = wrapped_estimate.saturating_sub(visible) as u16;
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "─".repeat(inner.width as usize),
            theme.text_dim(),
        ))),
        chunks[1],
    );
    frame.render_widget(input, chunks[2]);
}

fn message_lines(chat: &ChatWidget, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in chat.history.messages() {
        let (who, style) = match message.sender {
            Sender::User => ("You", theme.user_message()),
            Sender::Bot => ("Bot", theme.bot_message()),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", who), style),
            Span::styled(message.timestamp.clone(), theme.text_dim()),
        ]));
        for line in message.message.lines() {
            lines.push(Line::from(Span::styled(format!("  {}", line), theme.text())));
        }
    }

    if chat.is_typing() {
        lines.push(Line::from(vec![
            Span::styled("Bot ", theme.bot_message()),
            Span::styled(Icons::CURSOR, theme.active()),
        ]));
    }
    lines
}
