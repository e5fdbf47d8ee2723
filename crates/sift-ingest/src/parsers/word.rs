//! Word (.docx) document parser.

use super::{ensure_exists, DocumentParser};
use crate::error::{IngestError, IngestResult};
use docx_rs::{
    DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild, StructuredDataTag,
    StructuredDataTagChild, Table, TableCellContent, TableChild, TableRowChild,
};
use sift_core::{Segment, SourceRef};
use std::path::Path;

/// Parser for .docx files. The whole document becomes one segment.
///
/// Paragraphs are separated by a blank line; each table row becomes one line
/// with its cells joined by ` | `.
pub struct WordParser;

impl WordParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WordParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Blocks {
    text: Vec<String>,
    paragraphs: usize,
    tables: usize,
}

impl Blocks {
    fn push(&mut self, block: String) {
        if !block.trim().is_empty() {
            self.text.push(block);
        }
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        let text = paragraph_text(paragraph);
        if !text.trim().is_empty() {
            self.paragraphs += 1;
        }
        self.push(text);
    }

    fn table(&mut self, table: &Table) {
        let rows = table_rows(table);
        if !rows.is_empty() {
            self.tables += 1;
        }
        self.push(rows.join("\n"));
    }

    fn tag(&mut self, tag: &StructuredDataTag) {
        let mut inline = String::new();
        for child in &tag.children {
            match child {
                StructuredDataTagChild::Run(run) => push_run(&mut inline, run),
                StructuredDataTagChild::Paragraph(p) => self.paragraph(p),
                StructuredDataTagChild::Table(t) => self.table(t),
                StructuredDataTagChild::StructuredDataTag(inner) => self.tag(inner),
                _ => {}
            }
        }
        self.push(inline);
    }
}

fn push_run(text: &mut String, run: &Run) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            _ => {}
        }
    }
}

fn push_inline(text: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(text, run),
            ParagraphChild::Hyperlink(link) => push_inline(text, &link.children),
            ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let InsertChild::Run(run) = child {
                        push_run(text, run);
                    }
                }
            }
            ParagraphChild::StructuredDataTag(tag) => {
                for child in &tag.children {
                    match child {
                        StructuredDataTagChild::Run(run) => push_run(text, run),
                        StructuredDataTagChild::Paragraph(p) => {
                            push_inline(text, &p.children)
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_inline(&mut text, &paragraph.children);
    text
}

fn cell_text(content: &[TableCellContent]) -> String {
    let mut parts = Vec::new();
    for child in content {
        match child {
            TableCellContent::Paragraph(p) => parts.push(paragraph_text(p)),
            TableCellContent::Table(t) => parts.extend(table_rows(t)),
            _ => {}
        }
    }
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn table_rows(table: &Table) -> Vec<String> {
    table
        .rows
        .iter()
        .map(|TableChild::TableRow(row)| {
            row.cells
                .iter()
                .map(|TableRowChild::TableCell(cell)| cell_text(&cell.children))
                .collect::<Vec<_>>()
        })
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .map(|cells| cells.join(" | "))
        .collect()
}

impl DocumentParser for WordParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;

        let bytes = std::fs::read(path)?;
        let doc = docx_rs::read_docx(&bytes).map_err(|e| IngestError::parse(path, e.to_string()))?;

        let mut blocks = Blocks::default();
        for child in &doc.document.children {
            match child {
                DocumentChild::Paragraph(p) => blocks.paragraph(p),
                DocumentChild::Table(t) => blocks.table(t),
                DocumentChild::StructuredDataTag(tag) => blocks.tag(tag),
                _ => {}
            }
        }

        let metadata = serde_json::json!({
            "format": self.format(),
            "paragraphs": blocks.paragraphs,
            "tables": blocks.tables,
        });

        Ok(vec![
            Segment::new(blocks.text.join("\n\n"), SourceRef::new(path)).with_metadata(metadata)
        ])
    }

    fn format(&self) -> &'static str {
        "docx"
    }
}
