//! Markdown to display document conversion
//!
//! Builds a small typed document from pulldown-cmark events. Inline HTML
//! coming from the model (rating `<span>` wrappers, `<br>`) is dropped and
//! its text kept.

use super::heatmap::Rating;
use crate::types::{AppError, AppResult};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: InlineStyle,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: InlineStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub rating: Option<Rating>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rating: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Nesting depth, 0 for top-level items
    pub depth: usize,
    /// Item number for ordered lists
    pub number: Option<u64>,
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    List(Vec<ListItem>),
    Table(Table),
    Code(String),
    Rule,
    /// Visible annotation for content that could not be rendered
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

pub fn spans_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

impl Document {
    /// Error annotation followed by the untouched source
    pub fn fallback(error: &AppError, raw: &str) -> Self {
        Self {
            blocks: vec![
                Block::Error(format!("Error rendering Markdown: {}", error)),
                Block::Code(raw.to_string()),
            ],
        }
    }

    pub fn first_table(&self) -> Option<&Table> {
        self.blocks.iter().find_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }

    pub fn first_table_mut(&mut self) -> Option<&mut Table> {
        self.blocks.iter_mut().find_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.blocks.first(), Some(Block::Error(_)))
    }

    pub fn plain_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            match block {
                Block::Heading { spans, .. } | Block::Paragraph(spans) => {
                    lines.push(spans_text(spans));
                }
                Block::List(items) => {
                    for item in items {
                        let marker = match item.number {
                            Some(n) => format!("{}.", n),
                            None => "-".to_string(),
                        };
                        lines.push(format!(
                            "{}{} {}",
                            "  ".repeat(item.depth),
                            marker,
                            spans_text(&item.spans)
                        ));
                    }
                }
                Block::Table(table) => {
                    lines.push(join_cells(&table.header));
                    for row in &table.rows {
                        lines.push(join_cells(row));
                    }
                }
                Block::Code(code) => lines.extend(code.lines().map(str::to_string)),
                Block::Rule => lines.push("----".to_string()),
                Block::Error(message) => lines.push(message.clone()),
            }
        }
        lines
    }
}

fn join_cells(cells: &[Cell]) -> String {
    cells
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\t")
}

struct ListFrame {
    next_number: Option<u64>,
    items: Vec<ListItem>,
}

#[derive(Default)]
struct TableFrame {
    table: Table,
    row: Vec<Cell>,
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    style: InlineStyle,
    heading: Option<u8>,
    lists: Vec<ListFrame>,
    table: Option<TableFrame>,
    code: Option<String>,
    depth: usize,
}

impl Builder {
    fn push_text(&mut self, text: &str, style: InlineStyle) {
        if let Some(code) = self.code.as_mut() {
            code.push_str(text);
            return;
        }
        self.spans.push(Span {
            text: text.to_string(),
            style,
        });
    }

    /// Move pending inline text into the innermost open list as an item
    fn commit_item(&mut self) {
        if self.lists.is_empty() {
            return;
        }
        while self
            .spans
            .last()
            .is_some_and(|span| span.text.trim().is_empty())
        {
            self.spans.pop();
        }
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        let depth = self.lists.len().saturating_sub(1);
        if let Some(frame) = self.lists.last_mut() {
            let number = frame.next_number;
            if let Some(n) = frame.next_number.as_mut() {
                *n += 1;
            }
            frame.items.push(ListItem {
                depth,
                number,
                spans,
            });
        }
    }

    fn start(&mut self, tag: Tag) {
        self.depth += 1;
        match tag {
            Tag::Heading { level, .. } => {
                self.heading = Some(level as u8);
            }
            Tag::List(start) => {
                // Text of a parent item comes before its nested items
                self.commit_item();
                self.lists.push(ListFrame {
                    next_number: start,
                    items: Vec::new(),
                });
            }
            Tag::Item => self.commit_item(),
            Tag::Table(_) => self.table = Some(TableFrame::default()),
            Tag::TableHead | Tag::TableRow => {
                if let Some(frame) = self.table.as_mut() {
                    frame.row.clear();
                }
            }
            Tag::TableCell => self.spans.clear(),
            Tag::CodeBlock(_) => self.code = Some(String::new()),
            Tag::Strong => self.style.bold = true,
            Tag::Emphasis => self.style.italic = true,
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) -> AppResult<()> {
        if self.depth == 0 {
            return Err(AppError::Markup(format!("unexpected end of {:?}", tag)));
        }
        self.depth -= 1;

        match tag {
            TagEnd::Paragraph => {
                if !self.lists.is_empty() {
                    // Loose list items keep accumulating until the item ends
                    self.spans.push(Span::plain(" "));
                } else if self.table.is_none() && !self.spans.is_empty() {
                    let spans = std::mem::take(&mut self.spans);
                    self.blocks.push(Block::Paragraph(spans));
                }
            }
            TagEnd::Heading(_) => {
                let level = self.heading.take().unwrap_or(1);
                let spans = std::mem::take(&mut self.spans);
                self.blocks.push(Block::Heading { level, spans });
            }
            TagEnd::Item => self.commit_item(),
            TagEnd::List(_) => {
                self.commit_item();
                let frame = self
                    .lists
                    .pop()
                    .ok_or_else(|| AppError::Markup("list closed twice".to_string()))?;
                match self.lists.last_mut() {
                    Some(parent) => parent.items.extend(frame.items),
                    None => self.blocks.push(Block::List(frame.items)),
                }
            }
            TagEnd::TableCell => {
                let text = spans_text(&std::mem::take(&mut self.spans))
                    .trim()
                    .to_string();
                if let Some(frame) = self.table.as_mut() {
                    frame.row.push(Cell::new(text));
                }
            }
            TagEnd::TableHead => {
                if let Some(frame) = self.table.as_mut() {
                    frame.table.header = std::mem::take(&mut frame.row);
                }
            }
            TagEnd::TableRow => {
                if let Some(frame) = self.table.as_mut() {
                    let row = std::mem::take(&mut frame.row);
                    frame.table.rows.push(row);
                }
            }
            TagEnd::Table => {
                let frame = self
                    .table
                    .take()
                    .ok_or_else(|| AppError::Markup("table closed twice".to_string()))?;
                self.blocks.push(Block::Table(frame.table));
            }
            TagEnd::CodeBlock => {
                let code = self.code.take().unwrap_or_default();
                self.blocks
                    .push(Block::Code(code.trim_end_matches('\n').to_string()));
            }
            TagEnd::Strong => self.style.bold = false,
            TagEnd::Emphasis => self.style.italic = false,
            _ => {}
        }
        Ok(())
    }

    fn finish(self, source: &str) -> AppResult<Document> {
        if self.depth != 0 {
            return Err(AppError::Markup(format!(
                "{} element(s) left open",
                self.depth
            )));
        }
        if self.blocks.is_empty() && !source.trim().is_empty() {
            return Err(AppError::Markup("no renderable content".to_string()));
        }
        Ok(Document {
            blocks: self.blocks,
        })
    }
}

/// Convert markdown into a display document
pub fn convert(markdown: &str) -> AppResult<Document> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut builder = Builder::default();
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => builder.start(tag),
            Event::End(tag) => builder.end(tag)?,
            Event::Text(text) => {
                let style = builder.style;
                builder.push_text(&text, style);
            }
            Event::Code(code) => {
                let style = InlineStyle {
                    code: true,
                    ..builder.style
                };
                builder.push_text(&code, style);
            }
            Event::InlineHtml(html) => {
                if html.trim_start().to_ascii_lowercase().starts_with("<br") {
                    builder.push_text(" ", InlineStyle::default());
                }
            }
            Event::SoftBreak => builder.push_text(" ", InlineStyle::default()),
            Event::HardBreak => builder.push_text("\n", InlineStyle::default()),
            Event::Rule => builder.blocks.push(Block::Rule),
            _ => {}
        }
    }
    builder.finish(markdown)
}

/// Convert, or show the raw text under an error annotation
pub fn render_or_fallback(markdown: &str) -> Document {
    match convert(markdown) {
        Ok(document) => document,
        Err(e) => {
            warn!("Falling back to raw analysis text: {}", e);
            Document::fallback(&e, markdown)
        }
    }
}
