//! Image files. The pixels are read later by the vision model, so extraction
//! only records a placeholder naming the file.

use super::{display_name, ensure_exists, DocumentParser};
use crate::error::IngestResult;
use sift_core::{Segment, SourceRef};
use std::path::Path;

/// Placeholder text indexed for an uploaded image.
pub fn image_placeholder(name: &str) -> String {
    format!(
        "Uploaded Image Context: This is the file '{}'. Use the vision-capable analyze function to see its details.",
        name
    )
}

pub struct ImageParser;

impl ImageParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for ImageParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;

        let name = display_name(path);
        let metadata = serde_json::json!({
            "format": self.format(),
            "bytes": std::fs::metadata(path)?.len(),
        });

        Ok(vec![
            Segment::new(image_placeholder(&name), SourceRef::new(path)).with_metadata(metadata)
        ])
    }

    fn format(&self) -> &'static str {
        "image"
    }
}
