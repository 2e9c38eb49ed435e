//! Report Export
//!
//! PDF rendering (lopdf), base64 packaging for the email endpoint,
//! clipboard copy and recipient validation.

use super::AnalysisReport;
use crate::config::ExportConfig;
use crate::types::{AppError, AppResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::path::PathBuf;
use tracing::info;

/// Letter portrait in points
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
/// Half-inch margins
const MARGIN: i64 = 36;
const FONT_SIZE: i64 = 10;
const LINE_HEIGHT: i64 = 12;
/// Courier advances 0.6 em per glyph
const CHARS_PER_LINE: usize = ((PAGE_WIDTH - 2 * MARGIN) * 10 / (FONT_SIZE * 6)) as usize;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LINE_HEIGHT) as usize;

/// Reject anything that is not `local@domain.tld`-shaped
pub fn validate_email(address: &str) -> AppResult<String> {
    let invalid = || AppError::validation("Please enter a valid email address");
    let address = address.trim();

    if address.is_empty() || address.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = address.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(address.to_string())
}

/// Break report text into lines that fit the page width
fn wrap_lines(lines: &[String], width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    for line in lines {
        // Type1 base fonts only cover Latin-1; tabs become column gaps
        let line: String = line
            .replace('\t', "  |  ")
            .chars()
            .map(|c| if (c as u32) < 256 { c } else { '?' })
            .collect();

        if line.chars().count() <= width {
            wrapped.push(line);
            continue;
        }

        let mut current = String::new();
        for word in line.split(' ') {
            let word_len = word.chars().count();
            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + word_len > width {
                wrapped.push(std::mem::take(&mut current));
            }
            if word_len > width {
                // Hard-split words that can never fit
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(width) {
                    if !current.is_empty() {
                        wrapped.push(std::mem::take(&mut current));
                    }
                    current = chunk.iter().collect();
                }
                continue;
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        wrapped.push(current);
    }
    wrapped
}

/// Render the report to PDF bytes
#[cfg(feature = "pdf")]
pub fn render_pdf(report: &AnalysisReport) -> AppResult<Vec<u8>> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let lines = wrap_lines(&report.plain_lines(), CHARS_PER_LINE);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    for chunk in chunks {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
            Operation::new("TL", vec![LINE_HEIGHT.into()]),
            Operation::new(
                "Td",
                vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - FONT_SIZE).into()],
            ),
        ];
        for line in chunk {
            let bytes: Vec<u8> = line.chars().map(|c| c as u32 as u8).collect();
            operations.push(Operation::new("Tj", vec![Object::string_literal(bytes)]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| AppError::Export(format!("failed to encode page: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AppError::Export(format!("failed to write PDF: {}", e)))?;
    Ok(bytes)
}

#[cfg(not(feature = "pdf"))]
pub fn render_pdf(_report: &AnalysisReport) -> AppResult<Vec<u8>> {
    Err(AppError::MissingCapability(crate::types::Capability::PdfRenderer))
}

pub fn pdf_available() -> bool {
    cfg!(feature = "pdf")
}

/// PDF packaged for the `/send-report` endpoint
pub fn render_pdf_base64(report: &AnalysisReport) -> AppResult<String> {
    Ok(BASE64.encode(render_pdf(report)?))
}

/// Write the PDF into the export directory, replacing any previous report
pub async fn save_pdf(bytes: &[u8], export: &ExportConfig) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(&export.directory).await?;
    let path = export.directory.join(&export.pdf_filename);
    tokio::fs::write(&path, bytes).await?;
    info!("Saved report to {}", path.display());
    Ok(path)
}

/// Destination for "copy report"
pub trait ClipboardSink: Send {
    fn set_text(&mut self, text: &str) -> AppResult<()>;
}

/// The OS clipboard
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    #[cfg(feature = "clipboard")]
    fn set_text(&mut self, text: &str) -> AppResult<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| AppError::Export(format!("clipboard unavailable: {}", e)))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| AppError::Export(format!("clipboard write failed: {}", e)))
    }

    #[cfg(not(feature = "clipboard"))]
    fn set_text(&mut self, _text: &str) -> AppResult<()> {
        Err(AppError::MissingCapability(crate::types::Capability::Clipboard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Analysis;

    fn report(markdown: &str) -> AnalysisReport {
        AnalysisReport::from_analysis(&Analysis {
            index: 2,
            title: "Invoice matching".to_string(),
            directorate: "Finance".to_string(),
            markdown: markdown.to_string(),
        })
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" reviewer@sfda.gov.sa ").unwrap(), "reviewer@sfda.gov.sa");
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@.com").is_err());
        assert!(validate_email("a@b.").is_err());
        assert!(validate_email("a b@c.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("").is_err());
        assert!(validate_email("x").unwrap_err().is_validation());
    }

    #[test]
    fn test_wrap_lines_respects_width() {
        let long = "word ".repeat(40);
        let wrapped = wrap_lines(&[long, "short".to_string()], 20);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 20));
        assert_eq!(wrapped.last().unwrap(), "short");
    }

    #[test]
    fn test_wrap_lines_splits_long_words_and_replaces_wide_chars() {
        let wrapped = wrap_lines(&["abcdefghij".to_string(), "تحليل".to_string()], 4);
        assert_eq!(wrapped[..3], ["abcd", "efgh", "ij"]);
        assert_eq!(wrapped[3], "????");
        assert_eq!(wrapped[4], "?");
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_render_pdf_produces_pdf_bytes() {
        let body = "# Result\n\n".to_string() + &"A long paragraph line.\n\n".repeat(200);
        let bytes = render_pdf(&report(&body)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        // 200 paragraphs plus separators cannot fit on one page
        assert!(parsed.get_pages().len() > 1);
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_base64_payload_decodes_to_pdf() {
        let encoded = render_pdf_base64(&report("ok")).unwrap();
        let decoded = BASE64.decode(encoded).unwrap();
        assert!(decoded.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_save_pdf_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let export = ExportConfig {
            directory: dir.path().join("reports"),
            pdf_filename: "analysis_report.pdf".to_string(),
        };

        let path = save_pdf(b"%PDF-1.5 test", &export).await.unwrap();
        assert_eq!(path, dir.path().join("reports/analysis_report.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5 test");
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn test_pdf_missing_capability() {
        let err = render_pdf(&report("ok")).unwrap_err();
        assert!(matches!(
            err,
            AppError::MissingCapability(crate::types::Capability::PdfRenderer)
        ));
    }
}
