//! Format-specific parsers. Each yields one segment per logical unit.

mod audio;
mod csv;
mod html;
mod image;
mod markdown;
mod pdf;
mod slides;
mod spreadsheet;
mod text;
mod video;
mod word;

pub use audio::AudioParser;
pub use self::csv::CsvParser;
pub use html::HtmlParser;
pub use image::{image_placeholder, ImageParser};
pub use markdown::MarkdownParser;
pub use pdf::PdfParser;
pub use slides::SlidesParser;
pub use spreadsheet::SpreadsheetParser;
pub use text::TextParser;
pub use video::VideoParser;
pub use word::WordParser;

use crate::error::{IngestError, IngestResult};
use sift_core::Segment;
use std::path::Path;

/// Trait for document parsers.
pub trait DocumentParser: Send + Sync {
    /// Parse a file at the given path into text segments.
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>>;

    /// Short format label recorded in segment metadata.
    fn format(&self) -> &'static str;
}

pub(crate) fn ensure_exists(path: &Path) -> IngestResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(IngestError::FileNotFound(path.to_path_buf()))
    }
}

/// Read a file as strict UTF-8.
pub(crate) fn read_utf8(path: &Path) -> IngestResult<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| IngestError::InvalidUtf8(path.to_path_buf()))
}

/// File name used in titles and placeholders.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
