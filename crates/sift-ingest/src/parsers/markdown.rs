//! Markdown document parser.

use super::{ensure_exists, read_utf8, DocumentParser};
use crate::error::IngestResult;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};
use sift_core::{Segment, SourceRef};
use std::path::Path;

/// Parser for Markdown files. Rendered plain text becomes one segment.
/// Code blocks keep their fences.
pub struct MarkdownParser;

/// Plain text rendered from markdown.
struct Rendered {
    text: String,
    title: Option<String>,
    links: Vec<String>,
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self
    }

    fn render(&self, markdown: &str) -> Rendered {
        let mut text = String::new();
        let mut title: Option<String> = None;
        let mut links = Vec::new();
        let mut heading: Option<(HeadingLevel, String)> = None;

        for event in Parser::new(markdown) {
            match event {
                Event::Start(Tag::Heading(level, _, _)) => {
                    heading = Some((level, String::new()));
                }
                Event::End(Tag::Heading(_, _, _)) => {
                    if let Some((level, content)) = heading.take() {
                        let content = content.trim();
                        if level == HeadingLevel::H1 && title.is_none() {
                            title = Some(content.to_string());
                        }
                        text.push_str(content);
                        text.push_str("\n\n");
                    }
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    text.push_str("```\n");
                }
                Event::End(Tag::CodeBlock(_)) => {
                    text.push_str("```\n\n");
                }
                Event::Start(Tag::Link(_, dest, _)) => links.push(dest.to_string()),
                Event::End(Tag::Paragraph) => text.push_str("\n\n"),
                Event::End(Tag::List(_)) => text.push('\n'),
                Event::Start(Tag::Item) => text.push_str("- "),
                Event::End(Tag::Item) => text.push('\n'),
                Event::Text(t) => match heading.as_mut() {
                    Some((_, content)) => content.push_str(&t),
                    None => text.push_str(&t),
                },
                Event::Code(code) => {
                    let code = format!("`{}`", code);
                    match heading.as_mut() {
                        Some((_, content)) => content.push_str(&code),
                        None => text.push_str(&code),
                    }
                }
                Event::SoftBreak | Event::HardBreak => text.push('\n'),
                _ => {}
            }
        }

        Rendered {
            text: text.trim().to_string(),
            title,
            links,
        }
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for MarkdownParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;

        let content = read_utf8(path)?;
        let rendered = self.render(&content);

        let title = rendered.title.or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        });

        let metadata = serde_json::json!({
            "format": self.format(),
            "title": title,
            "links": rendered.links,
            "original_length": content.len(),
        });

        Ok(vec![
            Segment::new(rendered.text, SourceRef::new(path)).with_metadata(metadata)
        ])
    }

    fn format(&self) -> &'static str {
        "markdown"
    }
}
