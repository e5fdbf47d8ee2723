//! Core domain types for sift.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Broad handling category for an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Text,
    Image,
    Audio,
    Video,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Image => "image",
            Category::Audio => "audio",
            Category::Video => "video",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Concrete file format, detected from the declared extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Pdf,
    Word,
    LegacyWord,
    Slides,
    LegacySlides,
    Html,
    Spreadsheet,
    Csv,
    Markdown,
    PlainText,
    Image,
    Audio,
    Video,
    Unknown,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Word => "word",
            FileKind::LegacyWord => "legacy_word",
            FileKind::Slides => "slides",
            FileKind::LegacySlides => "legacy_slides",
            FileKind::Html => "html",
            FileKind::Spreadsheet => "spreadsheet",
            FileKind::Csv => "csv",
            FileKind::Markdown => "markdown",
            FileKind::PlainText => "plain_text",
            FileKind::Image => "image",
            FileKind::Audio => "audio",
            FileKind::Video => "video",
            FileKind::Unknown => "unknown",
        }
    }

    /// Detect the file kind from an extension. A leading dot is ignored.
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_lowercase();
        match ext.as_str() {
            "pdf" => FileKind::Pdf,
            "docx" => FileKind::Word,
            "doc" => FileKind::LegacyWord,
            "pptx" => FileKind::Slides,
            "ppt" => FileKind::LegacySlides,
            "html" | "htm" => FileKind::Html,
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => FileKind::Spreadsheet,
            "csv" => FileKind::Csv,
            "md" | "markdown" | "mdown" | "mkd" => FileKind::Markdown,
            // Plain text, code and markup
            "txt" | "text" | "log" | "json" | "css" | "js" | "ts" | "jsx" | "tsx" | "py"
            | "rs" | "go" | "c" | "cpp" | "h" | "hpp" | "java" | "rb" | "sh" | "yaml"
            | "yml" | "toml" | "xml" | "sql" | "rst" | "org" => FileKind::PlainText,
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" => FileKind::Image,
            "mp3" | "wav" | "m4a" | "flac" | "ogg" | "aac" => FileKind::Audio,
            "mp4" | "mov" | "avi" | "mkv" | "webm" | "m4v" => FileKind::Video,
            _ => FileKind::Unknown,
        }
    }

    /// Detect the file kind from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileKind::Unknown)
    }

    /// The handling category for this kind.
    pub fn category(&self) -> Category {
        match self {
            FileKind::Image => Category::Image,
            FileKind::Audio => Category::Audio,
            FileKind::Video => Category::Video,
            _ => Category::Text,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position of a segment inside its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Locator {
    /// 1-based page number.
    Page(u32),
    /// 1-based slide number.
    Slide(u32),
    /// Worksheet name.
    Sheet(String),
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Page(n) => write!(f, "page {}", n),
            Locator::Slide(n) => write!(f, "slide {}", n),
            Locator::Sheet(name) => write!(f, "sheet '{}'", name),
        }
    }
}

/// Where a piece of text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub path: String,
    pub locator: Option<Locator>,
}

impl SourceRef {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_string_lossy().to_string(),
            locator: None,
        }
    }

    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = Some(locator);
        self
    }
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.locator {
            Some(locator) => write!(f, "{} ({})", self.path, locator),
            None => write!(f, "{}", self.path),
        }
    }
}

/// A raw text segment produced by extraction (one page, slide, sheet or file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub source: SourceRef,
    pub metadata: serde_json::Value,
}

impl Segment {
    pub fn new(text: impl Into<String>, source: SourceRef) -> Self {
        Self {
            text: text.into(),
            source,
            metadata: serde_json::json!({}),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A bounded window of text, the unit of embedding and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk across the whole upload.
    pub ordinal: usize,
    pub content: String,
    /// Number of leading characters repeated from the previous chunk of the
    /// same segment.
    pub overlap: usize,
    pub source: SourceRef,
}

impl Chunk {
    pub fn new(ordinal: usize, content: impl Into<String>, source: SourceRef) -> Self {
        Self {
            ordinal,
            content: content.into(),
            overlap: 0,
            source,
        }
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// The text this chunk contributes beyond its leading overlap.
    pub fn core(&self) -> &str {
        match self.content.char_indices().nth(self.overlap) {
            Some((byte, _)) => &self.content[byte..],
            None => "",
        }
    }
}
