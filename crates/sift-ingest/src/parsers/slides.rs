//! PowerPoint (.pptx) parser.

use super::{ensure_exists, DocumentParser};
use crate::error::{IngestError, IngestResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use sift_core::{Locator, Segment, SourceRef};
use std::io::Read;
use std::path::Path;
use tracing::debug;

const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Parser for .pptx files. Yields one segment per slide with text.
pub struct SlidesParser;

impl SlidesParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SlidesParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Slide number from an archive entry such as `ppt/slides/slide12.xml`.
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Collect `<a:t>` runs, one line per `<a:p>` paragraph.
fn slide_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Text(e)) if in_text => {
                if let Ok(text) = e.unescape() {
                    if !line.is_empty() {
                        line.push(' ');
                    }
                    line.push_str(text.trim());
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if !line.trim().is_empty() {
                        lines.push(std::mem::take(&mut line));
                    }
                    line.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    if !line.trim().is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

impl DocumentParser for SlidesParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;

        let file = std::fs::File::open(path)?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| IngestError::parse(path, e.to_string()))?;

        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
            .collect();
        slides.sort_by_key(|(n, _)| *n);
        let total_slides = slides.len();

        let mut segments = Vec::new();
        for (number, name) in slides {
            let mut xml = String::new();
            archive
                .by_name(&name)
                .map_err(|e| IngestError::parse(path, e.to_string()))?
                .read_to_string(&mut xml)?;

            let text = slide_text(&xml);
            if text.is_empty() {
                continue;
            }

            segments.push(
                Segment::new(text, SourceRef::new(path).with_locator(Locator::Slide(number)))
                    .with_metadata(serde_json::json!({
                        "format": self.format(),
                        "slide": number,
                        "total_slides": total_slides,
                    })),
            );
        }

        debug!("Extracted {} of {} slides", segments.len(), total_slides);
        Ok(segments)
    }

    fn format(&self) -> &'static str {
        "pptx"
    }
}
