//! UI Rendering
//!
//! Main layout and rendering for the front-end. Reads the page view-model
//! and never mutates it.

use crate::page::{ChatPhase, Phase, TableLayout, WorkflowState, ABOUT_TAB, REPORT_TAB};
use crate::tui::app::{App, Focus, View};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use std::time::Instant;

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    let theme = Theme::for_mode(app.page.appearance.root);
    let body_theme = Theme::for_mode(app.page.appearance.body);
    frame.render_widget(Block::default().style(theme.root()), frame.area());

    let progress_height = if app.page.wizard.is_some() { 4 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),               // Header
            Constraint::Length(1),               // Tab bar
            Constraint::Length(progress_height), // Wizard
            Constraint::Min(8),                  // Active panel
            Constraint::Length(1),               // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app, theme);
    render_tab_bar(frame, chunks[1], app, theme);
    if let Some(wizard) = app.page.wizard.as_ref() {
        widgets::render_progress(frame, chunks[2], wizard, theme);
    }
    render_panel(frame, chunks[3], app, body_theme);
    render_status_bar(frame, chunks[4], app, theme);

    if let Some(chat) = app.page.chat.as_ref() {
        let chat_theme = Theme::for_mode(app.page.appearance.chat_container.unwrap_or_default());
        let fading = matches!(chat.phase, ChatPhase::Closing { .. });
        widgets::render_chat(
            frame,
            chat,
            &app.chat_input,
            chat_theme,
            app.focus == Focus::Chat,
            fading,
        );
    }

    match app.view {
        View::EmailPrompt => render_email_prompt(frame, app, theme),
        View::Help => render_help(frame, theme),
        View::Main => {}
    }

    widgets::render_spinner(frame, &app.page.spinner, theme, app.frame_count);
    widgets::render_toasts(frame, &app.page.toasts, theme, Instant::now());
}

/// Title, theme and API key status
fn render_header(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let mode = if app.page.appearance.mode.is_dark() {
        Icons::MOON
    } else {
        Icons::SUN
    };
    let key_badge = if app.has_api_key() {
        Span::styled(" API key ", theme.badge_success())
    } else {
        Span::styled(" no API key ", theme.badge_muted())
    };
    let chat_toggle = app.page.appearance.chat_toggle.map(|toggle_mode| {
        let toggle_theme = Theme::for_mode(toggle_mode);
        let open = app.page.chat.as_ref().is_some_and(|c| c.is_open());
        Span::styled(
            if open { " 💬 open " } else { " 💬 " },
            toggle_theme.shortcut_key(),
        )
    });

    let mut spans = vec![
        Span::styled("AiPrio", theme.title()),
        Span::styled(" Request Prioritization", theme.text_secondary()),
        Span::raw("  "),
        Span::styled(mode, theme.active()),
        Span::raw("  "),
        key_badge,
    ];
    spans.extend(chat_toggle);

    let title = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border()),
        );
    frame.render_widget(title, area);
}

fn render_tab_bar(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let titles: Vec<Line> = app
        .page
        .tabs
        .links
        .iter()
        .enumerate()
        .map(|(i, link)| Line::from(format!(" F{} {} ", i + 2, link.label)))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.page.tabs.active_link_index().unwrap_or(0))
        .style(theme.text_secondary())
        .highlight_style(theme.selected())
        .divider(Span::styled("│", theme.text_dim()));
    frame.render_widget(tabs, area);
}

/// Draw the active panel; a panel still fading in is dimmed
fn render_panel(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let Some(panel) = app.page.tabs.active_panel() else {
        return;
    };
    let fading = matches!(panel.phase, Phase::FadingIn { .. });

    match panel.name {
        REPORT_TAB => render_report_panel(frame, area, app, theme),
        ABOUT_TAB => render_about_panel(frame, area, theme),
        _ => render_analysis_panel(frame, area, app, theme),
    }

    if fading {
        frame
            .buffer_mut()
            .set_style(area, ratatui::style::Style::default().add_modifier(Modifier::DIM));
    }
}

fn render_analysis_panel(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(area);

    // File chooser
    let file_title = match &app.page.workflow.selected_file {
        Some(name) => format!(" CSV File · Selected: {} ", name),
        None => " CSV File ".to_string(),
    };
    let file_block = Block::default()
        .title(file_title)
        .borders(Borders::ALL)
        .border_style(theme.border_for(app.focus == Focus::FilePath));
    let inner = file_block.inner(rows[0]);
    frame.render_widget(file_block, rows[0]);
    frame.render_widget(&app.file_input, inner);

    // Narrow screens stack the list above the preview
    let direction = match app.page.table_layout {
        TableLayout::Columns => Direction::Horizontal,
        TableLayout::Cards => Direction::Vertical,
    };
    let lower = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    render_request_list(frame, lower[0], app, theme);
    render_preview(frame, lower[1], app, theme);
}

fn render_request_list(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let workflow = &app.page.workflow;
    let block = Block::default()
        .title(" Requests ")
        .title_bottom(Line::from(" Enter preview · Ctrl+R analyze ").right_aligned())
        .borders(Borders::ALL)
        .border_style(theme.border_for(app.focus == Focus::Requests));

    if workflow.options.is_empty() {
        let hint = match workflow.state {
            WorkflowState::Uploading => "Uploading...",
            _ => "Upload a CSV file to list its requests.",
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, theme.text_dim()))
                .block(block)
                .wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = workflow
        .options
        .iter()
        .map(|option| ListItem::new(Span::styled(option.label(), theme.text())))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected())
        .highlight_symbol(Icons::SELECTED);

    let mut state = ListState::default().with_selected(workflow.selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_preview(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let block = Block::default()
        .title(" Preview ")
        .borders(Borders::ALL)
        .border_style(theme.border());
    let inner_width = block.inner(area).width as usize;

    let lines = match &app.page.workflow.preview {
        Some(preview) => widgets::preview_lines(preview, theme, app.page.table_layout, inner_width),
        None => vec![Line::from(Span::styled(
            "Select a request and press Enter to preview it.",
            theme.text_dim(),
        ))],
    };
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_report_panel(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let workflow = &app.page.workflow;
    let evaluator_height = if workflow.evaluator_visible { 3 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(evaluator_height)])
        .split(area);

    let block = Block::default()
        .title(" Results ")
        .title_bottom(
            Line::from(" Ctrl+D pdf · Ctrl+Y copy · Ctrl+E email · Ctrl+K clear cache ")
                .right_aligned(),
        )
        .borders(Borders::ALL)
        .border_style(theme.border());
    let inner_width = block.inner(rows[0]).width as usize;

    let lines = match &workflow.report {
        Some(report) => {
            widgets::report_lines(report, theme, app.page.table_layout, inner_width)
        }
        None if workflow.state == WorkflowState::Analyzing => vec![Line::from(Span::styled(
            "Retrieving analysis...",
            theme.active(),
        ))],
        None => vec![Line::from(Span::styled(
            "No analysis yet. Select a request and press Ctrl+R.",
            theme.text_dim(),
        ))],
    };
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((app.report_scroll, 0)),
        rows[0],
    );

    if workflow.evaluator_visible {
        let evaluator = Block::default()
            .title(" Evaluator ")
            .borders(Borders::ALL)
            .border_style(theme.border_for(app.focus == Focus::Evaluator));
        let inner = evaluator.inner(rows[1]);
        frame.render_widget(evaluator, rows[1]);
        frame.render_widget(&app.evaluator_input, inner);
    }
}

fn render_about_panel(frame: &mut Frame, area: Rect, theme: &Theme) {
    let lines = vec![
        Line::from(Span::styled("About", theme.heading())),
        Line::from(""),
        Line::from(Span::styled(
            "Upload a CSV of requests, preview a row, and retrieve an AI \
             prioritization analysis for it. The assistant answers questions \
             using the latest analysis as context.",
            theme.text(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Reports can be saved as PDF, copied to the clipboard, or emailed.",
            theme.text_secondary(),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" About ")
                    .borders(Borders::ALL)
                    .border_style(theme.border()),
            )
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let status = match app.page.workflow.state {
        WorkflowState::Idle => Span::styled("Ready", theme.text_secondary()),
        WorkflowState::Uploading => Span::styled("Uploading...", theme.active()),
        WorkflowState::ReadyToSelect => Span::styled("Select a request", theme.text_secondary()),
        WorkflowState::Previewing => Span::styled("Loading preview...", theme.active()),
        WorkflowState::Analyzing => Span::styled("Analyzing...", theme.active()),
        WorkflowState::AnalysisReady => Span::styled("Analysis ready", theme.complete()),
    };

    let shortcuts = vec![
        Span::styled(" [Tab]", theme.shortcut_key()),
        Span::styled(" Focus ", theme.shortcut_desc()),
        Span::styled("[Ctrl+O]", theme.shortcut_key()),
        Span::styled(" Chat ", theme.shortcut_desc()),
        Span::styled("[Ctrl+T]", theme.shortcut_key()),
        Span::styled(" Theme ", theme.shortcut_desc()),
        Span::styled("[Ctrl+Q]", theme.shortcut_key()),
        Span::styled(" Quit ", theme.shortcut_desc()),
        Span::styled("[F1]", theme.shortcut_key()),
        Span::styled(" Help", theme.shortcut_desc()),
    ];

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcuts)
            .collect::<Vec<_>>(),
    );
    frame.render_widget(Paragraph::new(line), area);
}

fn render_email_prompt(frame: &mut Frame, app: &App, theme: &Theme) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Email report to ")
        .title_bottom(Line::from(" Enter send · Esc cancel ").right_aligned())
        .borders(Borders::ALL)
        .border_style(theme.border_focused())
        .style(theme.surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.email_input, inner);
}

/// Render the help modal
fn render_help(frame: &mut Frame, theme: &Theme) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let keys = [
        ("Enter        ", "Upload / preview / add name / send"),
        ("Tab          ", "Next field"),
        ("F2 F3 F4     ", "Analysis, Report, About tabs"),
        ("↑/↓          ", "Select request / scroll report"),
        ("Ctrl+P       ", "Preview selected request"),
        ("Ctrl+R       ", "Analyze selected request"),
        ("Ctrl+D       ", "Save report as PDF"),
        ("Ctrl+Y       ", "Copy report"),
        ("Ctrl+E       ", "Email report"),
        ("Ctrl+K       ", "Clear analysis cache"),
        ("Ctrl+O       ", "Open / close chat"),
        ("Ctrl+L       ", "Clear chat history"),
        ("Ctrl+T       ", "Toggle dark mode"),
        ("Esc          ", "Close chat / prompt"),
        ("Ctrl+Q       ", "Quit"),
    ];

    let mut help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", theme.heading())),
        Line::from(""),
    ];
    help_lines.extend(keys.iter().map(|(key, desc)| {
        Line::from(vec![
            Span::styled(*key, theme.shortcut_key()),
            Span::styled(*desc, theme.text()),
        ])
    }));
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        theme.text_dim(),
    )));

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(theme.border_focused())
            .style(theme.surface()),
    );
    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
