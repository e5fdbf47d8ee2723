//! HTML document parser.

use super::{ensure_exists, read_utf8, DocumentParser};
use crate::error::{IngestError, IngestResult};
use scraper::{Html, Node, Selector};
use sift_core::{Segment, SourceRef};
use std::path::Path;

const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Parser for HTML pages. Visible body text becomes one segment.
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    fn selector(path: &Path, css: &str) -> IngestResult<Selector> {
        Selector::parse(css).map_err(|e| IngestError::parse(path, format!("{:?}", e)))
    }

    /// Body text and `<title>`, with script and style content dropped.
    fn extract(path: &Path, html: &str) -> IngestResult<(String, Option<String>)> {
        let document = Html::parse_document(html);

        let title = document
            .select(&Self::selector(path, "title")?)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let root = document
            .select(&Self::selector(path, "body")?)
            .next()
            .unwrap_or_else(|| document.root_element());

        let mut words: Vec<&str> = Vec::new();
        for node in root.descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
            });
            if hidden {
                continue;
            }
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                words.push(trimmed);
            }
        }

        Ok((words.join(" "), title))
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for HtmlParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;

        let html = read_utf8(path)?;
        let (text, title) = Self::extract(path, &html)?;

        let metadata = serde_json::json!({
            "format": self.format(),
            "title": title,
        });

        Ok(vec![Segment::new(text, SourceRef::new(path)).with_metadata(metadata)])
    }

    fn format(&self) -> &'static str {
        "html"
    }
}
