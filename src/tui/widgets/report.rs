//! Report Widget
//!
//! Turns the analysis document and the preview row into styled lines.
//! Tables are drawn as a grid, or as stacked `label: value` cards when the
//! viewport is narrow.

use crate::api::PreviewRow;
use crate::page::TableLayout;
use crate::report::{AnalysisReport, Block, Document, InlineStyle, Span as DocSpan, Table};
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// Lines of the full results view: evaluator, heading, directorate, body
pub fn report_lines(
    report: &AnalysisReport,
    theme: &Theme,
    layout: TableLayout,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(evaluator) = report.evaluator_heading() {
        lines.push(Line::from(Span::styled(evaluator, theme.title())));
    }
    lines.push(Line::from(Span::styled(report.heading(), theme.heading())));
    lines.push(Line::from(Span::styled(
        report.directorate_line(),
        theme.text_secondary(),
    )));
    lines.push(Line::from(""));
    lines.extend(document_lines(&report.body, theme, layout, width));
    lines
}

pub fn document_lines(
    document: &Document,
    theme: &Theme,
    layout: TableLayout,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (i, block) in document.blocks.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        match block {
            Block::Heading { level, spans } => {
                let style = if *level <= 2 {
                    theme.title()
                } else {
                    theme.heading()
                };
                lines.push(Line::from(styled_spans(spans, theme, style)));
            }
            Block::Paragraph(spans) => {
                lines.push(Line::from(styled_spans(spans, theme, theme.text())));
            }
            Block::List(items) => {
                for item in items {
                    let marker = match item.number {
                        Some(n) => format!("{}. ", n),
                        None => format!("{} ", Icons::BULLET),
                    };
                    let mut spans = vec![Span::styled(
                        format!("{}{}", "  ".repeat(item.depth), marker),
                        theme.text_secondary(),
                    )];
                    spans.extend(styled_spans(&item.spans, theme, theme.text()));
                    lines.push(Line::from(spans));
                }
            }
            Block::Table(table) => match layout {
                TableLayout::Columns => lines.extend(table_grid(table, theme, width)),
                TableLayout::Cards => lines.extend(table_cards(table, theme)),
            },
            Block::Code(code) => {
                for line in code.lines() {
                    lines.push(Line::from(Span::styled(format!("  {}", line), theme.code())));
                }
            }
            Block::Rule => {
                lines.push(Line::from(Span::styled(
                    "─".repeat(width.max(1)),
                    theme.text_dim(),
                )));
            }
            Block::Error(message) => {
                lines.push(Line::from(Span::styled(message.clone(), theme.error())));
            }
        }
    }

    lines
}

fn styled_spans(spans: &[DocSpan], theme: &Theme, base: Style) -> Vec<Span<'static>> {
    spans
        .iter()
        .map(|span| Span::styled(span.text.clone(), inline_style(span.style, theme, base)))
        .collect()
}

fn inline_style(inline: InlineStyle, theme: &Theme, base: Style) -> Style {
    let mut style = if inline.code { theme.code() } else { base };
    if inline.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    style
}

/// Column widths that fit `width`, shrinking the widest columns first
fn column_widths(table: &Table, width: usize) -> Vec<usize> {
    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.header.len()))
        .max()
        .unwrap_or(0);
    let mut widths = vec![1usize; columns];
    for row in std::iter::once(&table.header).chain(table.rows.iter()) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.text.chars().count());
        }
    }

    // " │ " between columns
    let separators = columns.saturating_sub(1) * 3;
    let budget = width.saturating_sub(separators).max(columns);
    while widths.iter().sum::<usize>() > budget {
        let Some((widest, _)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if widths[widest] <= 1 {
            break;
        }
        widths[widest] -= 1;
    }
    widths
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else if width > 1 {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    } else {
        text.chars().take(width).collect()
    }
}

fn table_grid(table: &Table, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let widths = column_widths(table, width);
    let mut lines = Vec::new();

    let header: Vec<Span> = table
        .header
        .iter()
        .enumerate()
        .flat_map(|(i, cell)| {
            let mut spans = Vec::new();
            if i > 0 {
                spans.push(Span::styled(" │ ", theme.text_dim()));
            }
            spans.push(Span::styled(fit(&cell.text, widths[i]), theme.heading()));
            spans
        })
        .collect();
    lines.push(Line::from(header));

    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    lines.push(Line::from(Span::styled(rule.join("─┼─"), theme.text_dim())));

    for row in &table.rows {
        let mut spans = Vec::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", theme.text_dim()));
            }
            let style = cell.rating.map_or(theme.text(), |r| theme.rating(r));
            spans.push(Span::styled(fit(&cell.text, widths[i]), style));
        }
        lines.push(Line::from(spans));
    }
    lines
}

/// One card per row: the first cell as title, then `header: value` lines
fn table_cards(table: &Table, theme: &Theme) -> Vec<Line<'static>> {
    let labels: Vec<&str> = table.header.iter().map(|c| c.text.as_str()).collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut lines = Vec::new();

    for (idx, row) in table.rows.iter().enumerate() {
        let Some(first) = row.first() else {
            continue;
        };
        lines.push(Line::from(Span::styled(
            format!("[ {} ]", first.text.trim()),
            theme.heading(),
        )));

        for (i, cell) in row.iter().enumerate().skip(1) {
            if cell.text.trim().is_empty() {
                continue;
            }
            let label = labels.get(i).copied().unwrap_or("");
            let style = cell.rating.map_or(theme.text(), |r| theme.rating(r));
            lines.push(Line::from(vec![
                Span::styled(format!("{:<w$}: ", label, w = label_width), theme.text_secondary()),
                Span::styled(cell.text.clone(), style),
            ]));
        }

        if idx + 1 < table.rows.len() {
            lines.push(Line::from(""));
        }
    }
    lines
}

/// The preview row as a two-column field/value table
pub fn preview_lines(
    preview: &PreviewRow,
    theme: &Theme,
    layout: TableLayout,
    width: usize,
) -> Vec<Line<'static>> {
    let label_width = preview
        .fields
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        .min(width / 3);

    preview
        .fields
        .iter()
        .flat_map(|(name, value)| match layout {
            TableLayout::Columns => vec![Line::from(vec![
                Span::styled(fit(name, label_width), theme.text_secondary()),
                Span::styled(" │ ", theme.text_dim()),
                Span::styled(value.clone(), theme.text()),
            ])],
            TableLayout::Cards => vec![
                Line::from(Span::styled(name.clone(), theme.heading())),
                Line::from(Span::styled(format!("  {}", value), theme.text())),
            ],
        })
        .collect()
}
