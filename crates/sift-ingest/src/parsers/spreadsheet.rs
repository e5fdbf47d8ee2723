//! Spreadsheet parser (xlsx, xls, xlsm, xlsb, ods).

use super::{ensure_exists, DocumentParser};
use crate::error::{IngestError, IngestResult};
use calamine::{open_workbook_auto, Data, Reader};
use sift_core::{Locator, Segment, SourceRef};
use std::path::Path;
use tracing::warn;

/// Parser for workbooks. Yields one segment per sheet with cell text.
pub struct SpreadsheetParser;

impl SpreadsheetParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpreadsheetParser {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}

/// Render sheet rows as ` | `-joined lines, skipping rows with no values.
fn render_rows<'a>(rows: impl Iterator<Item = &'a [Data]>) -> String {
    rows.map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .map(|cells| cells.join(" | "))
        .collect::<Vec<_>>()
        .join("\n")
}

impl DocumentParser for SpreadsheetParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;

        let mut workbook =
            open_workbook_auto(path).map_err(|e| IngestError::parse(path, e.to_string()))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut segments = Vec::new();

        for name in &sheet_names {
            let range = match workbook.worksheet_range(name) {
                Ok(range) => range,
                Err(e) => {
                    warn!("Skipping sheet '{}' in {:?}: {}", name, path, e);
                    continue;
                }
            };

            let text = render_rows(range.rows());
            if text.is_empty() {
                continue;
            }

            segments.push(
                Segment::new(
                    format!("Sheet: {}\n{}", name, text),
                    SourceRef::new(path).with_locator(Locator::Sheet(name.clone())),
                )
                .with_metadata(serde_json::json!({
                    "format": self.format(),
                    "sheet": name,
                    "total_sheets": sheet_names.len(),
                })),
            );
        }

        Ok(segments)
    }

    fn format(&self) -> &'static str {
        "spreadsheet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const SHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Write a two-sheet workbook: "Inventory" with a header and two rows,
    /// "Notes" left empty.
    fn write_workbook(path: &Path) {
        let workbook = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="{SHEET_NS}" xmlns:r="{REL_NS}"><sheets>
<sheet name="Inventory" sheetId="1" r:id="rId1"/>
<sheet name="Notes" sheetId="2" r:id="rId2"/>
</sheets></workbook>"#
        );
        let rels = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
</Relationships>"#;
        let strings = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="{SHEET_NS}" count="4" uniqueCount="4">
<si><t>part</t></si><si><t>qty</t></si><si><t>bolts</t></si><si><t>nuts</t></si>
</sst>"#
        );
        let inventory = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="{SHEET_NS}"><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
<row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>40</v></c></row>
<row r="3"><c r="A3" t="s"><v>3</v></c><c r="B3"><v>2.5</v></c></row>
</sheetData></worksheet>"#
        );
        let notes = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="{SHEET_NS}"><sheetData></sheetData></worksheet>"#
        );

        let mut zip = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, body) in [
            ("xl/workbook.xml", workbook.as_str()),
            ("xl/_rels/workbook.xml.rels", rels),
            ("xl/sharedStrings.xml", strings.as_str()),
            ("xl/worksheets/sheet1.xml", inventory.as_str()),
            ("xl/worksheets/sheet2.xml", notes.as_str()),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_parse_xlsx_yields_one_segment_per_non_empty_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.xlsx");
        write_workbook(&path);

        let segments = SpreadsheetParser::new().parse(&path).unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(
            segments[0].text,
            "Sheet: Inventory\npart | qty\nbolts | 40\nnuts | 2.5"
        );
        assert_eq!(
            segments[0].source.locator,
            Some(Locator::Sheet("Inventory".to_string()))
        );
        assert_eq!(segments[0].metadata["total_sheets"], 2);
    }

    #[test]
    fn test_render_rows_skips_blank_rows() {
        let rows: Vec<Vec<Data>> = vec![
            vec![Data::String("name".into()), Data::String("qty".into())],
            vec![Data::Empty, Data::Empty],
            vec![Data::String("bolts".into()), Data::Int(40)],
            vec![Data::String("nuts".into()), Data::Float(2.5)],
        ];

        let text = render_rows(rows.iter().map(|r| r.as_slice()));
        assert_eq!(text, "name | qty\nbolts | 40\nnuts | 2.5");
    }

    #[test]
    fn test_corrupt_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        assert!(SpreadsheetParser::new().parse(&path).is_err());
    }
}
