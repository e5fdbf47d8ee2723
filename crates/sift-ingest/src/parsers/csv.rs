//! CSV parser. Renders the table as aligned text before chunking.

use super::{ensure_exists, DocumentParser};
use crate::error::{IngestError, IngestResult};
use sift_core::{Segment, SourceRef};
use std::path::Path;

/// Parser for comma-separated files.
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

fn cell(row: &[String], i: usize) -> &str {
    row.get(i).map(String::as_str).unwrap_or("")
}

/// Lay out a header and rows as right-aligned columns with a leading row index.
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);

    let mut widths: Vec<usize> = (0..columns).map(|i| cell(headers, i).chars().count()).collect();
    for row in rows {
        for (i, width) in widths.iter_mut().enumerate() {
            *width = (*width).max(cell(row, i).chars().count());
        }
    }
    let index_width = rows.len().saturating_sub(1).to_string().len();

    let render_line = |label: &str, row: &[String]| {
        let mut line = format!("{:>w$}", label, w = index_width);
        for (i, width) in widths.iter().enumerate() {
            line.push_str(&format!("  {:>w$}", cell(row, i), w = width));
        }
        line.trim_end().to_string()
    };

    let mut lines = vec![render_line("", headers)];
    for (i, row) in rows.iter().enumerate() {
        lines.push(render_line(&i.to_string(), row.as_slice()));
    }
    lines.join("\n")
}

impl DocumentParser for CsvParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| IngestError::parse(path, e.to_string()))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| IngestError::parse(path, e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| IngestError::parse(path, e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let metadata = serde_json::json!({
            "format": self.format(),
            "columns": headers,
            "rows": rows.len(),
        });

        Ok(vec![
            Segment::new(render_table(&headers, &rows), SourceRef::new(path)).with_metadata(metadata)
        ])
    }

    fn format(&self) -> &'static str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_alignment() {
        let headers = vec!["city".to_string(), "population".to_string()];
        let rows = vec![
            vec!["Oslo".to_string(), "709000".to_string()],
            vec!["Reykjavik".to_string(), "139000".to_string()],
        ];

        let table = render_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "        city  population");
        assert_eq!(lines[1], "0       Oslo      709000");
        assert_eq!(lines[2], "1  Reykjavik      139000");
    }

    #[test]
    fn test_parse_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.csv");
        std::fs::write(&path, "item,count\nwidget,3\ngadget,12\n").unwrap();

        let segments = CsvParser::new().parse(&path).unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].text.contains("widget"));
        assert!(segments[0].text.contains("gadget"));
        assert_eq!(segments[0].metadata["rows"], 2);
    }
}
