//! PDF document parser.

use super::{ensure_exists, DocumentParser};
use crate::error::{IngestError, IngestResult};
use lopdf::Document;
use sift_core::{Locator, Segment, SourceRef};
use std::path::Path;
use tracing::debug;

/// Parser for PDF files. Yields one segment per page with text.
pub struct PdfParser;

impl PdfParser {
    pub fn new() -> Self {
        Self
    }

    /// Page texts via lopdf, keyed by 1-based page number.
    fn pages_with_lopdf(path: &Path) -> IngestResult<Vec<(u32, String)>> {
        let document = Document::load(path).map_err(|e| IngestError::parse(path, e.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|e| IngestError::parse(path, e.to_string()))?;
            pages.push((page_no, text));
        }
        Ok(pages)
    }

    /// Whole-document extraction; pages are separated by form feeds.
    fn pages_with_pdf_extract(path: &Path) -> IngestResult<Vec<(u32, String)>> {
        let content = pdf_extract::extract_text(path).map_err(|e| {
            IngestError::parse(path, format!("Failed to extract text from PDF: {}", e))
        })?;

        Ok(content
            .split('\x0C')
            .enumerate()
            .map(|(i, page)| (i as u32 + 1, page.to_string()))
            .collect())
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for PdfParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;
        debug!("Parsing PDF: {:?}", path);

        let pages = match Self::pages_with_lopdf(path) {
            Ok(pages) if pages.iter().any(|(_, text)| !text.trim().is_empty()) => pages,
            Ok(_) => {
                debug!("lopdf found no page text, retrying with pdf-extract");
                Self::pages_with_pdf_extract(path)?
            }
            Err(e) => {
                debug!("lopdf failed ({}), retrying with pdf-extract", e);
                Self::pages_with_pdf_extract(path)?
            }
        };

        let total_pages = pages.len();
        let segments: Vec<Segment> = pages
            .into_iter()
            .map(|(page, text)| (page, clean_pdf_text(&text)))
            .filter(|(_, text)| !text.is_empty())
            .map(|(page, text)| {
                Segment::new(text, SourceRef::new(path).with_locator(Locator::Page(page)))
                    .with_metadata(serde_json::json!({
                        "format": self.format(),
                        "page": page,
                        "total_pages": total_pages,
                    }))
            })
            .collect();

        if segments.is_empty() {
            return Err(IngestError::parse(path, "PDF has no readable page text"));
        }

        debug!("Extracted {} pages from PDF", segments.len());
        Ok(segments)
    }

    fn format(&self) -> &'static str {
        "pdf"
    }
}

/// Trim lines and collapse runs of blank lines.
fn clean_pdf_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .fold(Vec::new(), |mut acc: Vec<&str>, line| {
            let last_was_empty = acc.last().map(|s| s.is_empty()).unwrap_or(false);
            if !(line.is_empty() && last_was_empty) {
                acc.push(line);
            }
            acc
        })
        .join("\n")
        .trim()
        .to_string()
}
