//! Plain text parser, also used for code, markup and unknown extensions.

use super::{display_name, ensure_exists, read_utf8, DocumentParser};
use crate::error::IngestResult;
use sift_core::{Segment, SourceRef};
use std::path::Path;

/// Parser for UTF-8 text files. Undecodable bytes are an error.
pub struct TextParser;

impl TextParser {
    pub fn new() -> Self {
        Self
    }

    /// Detect programming language from extension.
    fn detect_language(extension: &str) -> Option<&'static str> {
        match extension.to_lowercase().as_str() {
            "rs" => Some("rust"),
            "py" => Some("python"),
            "js" | "jsx" => Some("javascript"),
            "ts" | "tsx" => Some("typescript"),
            "go" => Some("go"),
            "c" => Some("c"),
            "cpp" | "h" | "hpp" => Some("cpp"),
            "java" => Some("java"),
            "rb" => Some("ruby"),
            "sh" => Some("shell"),
            "json" => Some("json"),
            "yaml" | "yml" => Some("yaml"),
            "toml" => Some("toml"),
            "xml" => Some("xml"),
            "css" => Some("css"),
            "sql" => Some("sql"),
            _ => None,
        }
    }

    fn is_plain(extension: &str) -> bool {
        matches!(
            extension.to_lowercase().as_str(),
            "txt" | "text" | "log" | "rst" | "org"
        )
    }
}

impl Default for TextParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for TextParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;

        let content = read_utf8(path)?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let language = Self::detect_language(extension);

        let format = if language.is_some() {
            "code"
        } else if Self::is_plain(extension) {
            self.format()
        } else {
            "unknown"
        };

        let mut metadata = serde_json::json!({
            "format": format,
            "title": display_name(path),
            "length": content.len(),
            "lines": content.lines().count(),
        });
        if let Some(lang) = language {
            metadata["language"] = serde_json::json!(lang);
        }

        Ok(vec![Segment::new(content, SourceRef::new(path)).with_metadata(metadata)])
    }

    fn format(&self) -> &'static str {
        "text"
    }
}
