//! Format dispatch for uploaded files.

use crate::error::{IngestError, IngestResult};
use crate::parsers::{
    AudioParser, CsvParser, DocumentParser, HtmlParser, ImageParser, MarkdownParser, PdfParser,
    SlidesParser, SpreadsheetParser, TextParser, VideoParser, WordParser,
};
use sift_core::{FileKind, Segment};
use sift_process::Transcriber;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns one file into text segments, choosing a parser by declared extension.
pub struct Extractor {
    pdf: PdfParser,
    word: WordParser,
    slides: SlidesParser,
    html: HtmlParser,
    spreadsheet: SpreadsheetParser,
    csv: CsvParser,
    markdown: MarkdownParser,
    text: TextParser,
    image: ImageParser,
    audio: AudioParser,
    video: VideoParser,
}

impl Extractor {
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            pdf: PdfParser::new(),
            word: WordParser::new(),
            slides: SlidesParser::new(),
            html: HtmlParser::new(),
            spreadsheet: SpreadsheetParser::new(),
            csv: CsvParser::new(),
            markdown: MarkdownParser::new(),
            text: TextParser::new(),
            image: ImageParser::new(),
            audio: AudioParser::new(transcriber.clone()),
            video: VideoParser::new(transcriber),
        }
    }

    /// Place temporary media work directories under `dir`.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.video = self.video.with_scratch_dir(dir);
        self
    }

    /// The parser for a file kind. Legacy binary Office formats have none.
    pub fn parser_for(&self, kind: FileKind) -> Option<&dyn DocumentParser> {
        let parser: &dyn DocumentParser = match kind {
            FileKind::Pdf => &self.pdf,
            FileKind::Word => &self.word,
            FileKind::Slides => &self.slides,
            FileKind::Html => &self.html,
            FileKind::Spreadsheet => &self.spreadsheet,
            FileKind::Csv => &self.csv,
            FileKind::Markdown => &self.markdown,
            FileKind::PlainText | FileKind::Unknown => &self.text,
            FileKind::Image => &self.image,
            FileKind::Audio => &self.audio,
            FileKind::Video => &self.video,
            FileKind::LegacyWord | FileKind::LegacySlides => return None,
        };
        Some(parser)
    }

    /// Extract segments, surfacing the failure.
    pub fn try_extract(&self, path: &Path, extension: &str) -> IngestResult<Vec<Segment>> {
        let kind = FileKind::from_extension(extension);
        let parser = match (self.parser_for(kind), kind) {
            (Some(parser), _) => parser,
            (None, FileKind::LegacySlides) => {
                return Err(IngestError::LegacyFormat {
                    legacy: "ppt",
                    modern: "pptx",
                })
            }
            (None, _) => {
                return Err(IngestError::LegacyFormat {
                    legacy: "doc",
                    modern: "docx",
                })
            }
        };

        debug!(
            "Extracting {:?} as {} ({} via {})",
            path,
            kind,
            kind.category(),
            parser.format()
        );
        let segments = parser.parse(path)?;
        info!("Extracted {} segments from {:?}", segments.len(), path);
        Ok(segments)
    }

    /// Extract segments. Any failure is logged and yields no segments.
    pub fn extract(&self, path: &Path, extension: &str) -> Vec<Segment> {
        match self.try_extract(path, extension) {
            Ok(segments) => segments,
            Err(e) => {
                warn!("Extraction failed for {:?}: {}", path, e);
                Vec::new()
            }
        }
    }

    /// [`try_extract`](Self::try_extract) using the path's own extension.
    pub fn try_extract_path(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.try_extract(path, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::Locator;
    use sift_process::{ProcessError, ProcessResult, Transcript};
    use std::io::Write;

    struct NoSpeech;

    impl Transcriber for NoSpeech {
        fn transcribe(&self, _audio_path: &Path) -> ProcessResult<Transcript> {
            Err(ProcessError::ToolNotFound {
                tool: "whisper".into(),
            })
        }

        fn name(&self) -> &str {
            "none"
        }
    }

    fn extractor() -> Extractor {
        Extractor::new(Arc::new(NoSpeech))
    }

    #[test]
    fn test_dispatch_ignores_case_and_dot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        std::fs::write(&path, "# Title\n\nBody text.").unwrap();

        let segments = extractor().try_extract(&path, ".MD").unwrap();
        assert_eq!(segments[0].metadata["format"], "markdown");
        assert_eq!(segments[0].text, "Title\n\nBody text.");
    }

    #[test]
    fn test_docx_extraction() {
        use docx_rs::{Docx, Paragraph, Run};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.docx");
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("The launch is in May.")))
            .build()
            .pack(std::fs::File::create(&path).unwrap())
            .unwrap();

        let segments = extractor().extract(&path, "docx");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "The launch is in May.");
    }

    #[test]
    fn test_pptx_extraction() {
        use zip::write::SimpleFileOptions;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pitch.pptx");
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        zip.start_file("ppt/slides/slide1.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(br#"<p:sld xmlns:a="a" xmlns:p="p"><a:p><a:r><a:t>Market size</a:t></a:r></a:p></p:sld>"#)
            .unwrap();
        zip.finish().unwrap();

        let segments = extractor().extract(&path, "pptx");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Market size");
        assert_eq!(segments[0].source.locator, Some(Locator::Slide(1)));
    }

    #[test]
    fn test_unknown_extension_reads_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.xyz");
        std::fs::write(&path, "freeform notes").unwrap();

        let segments = extractor().extract(&path, "xyz");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "freeform notes");
        assert_eq!(segments[0].metadata["format"], "unknown");
    }

    #[test]
    fn test_image_yields_exactly_one_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.jpg");
        std::fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();

        let segments = extractor().extract(&path, "jpg");
        assert_eq!(segments.len(), 1);
        assert!(segments[0].text.contains("'chart.jpg'"));
    }

    #[test]
    fn test_failures_yield_no_segments() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("blob.dat");
        std::fs::write(&binary, [0xc3, 0x28, 0xa0, 0xa1]).unwrap();
        let legacy = dir.path().join("old.doc");
        std::fs::write(&legacy, b"\xd0\xcf\x11\xe0").unwrap();
        let audio = dir.path().join("memo.wav");
        std::fs::write(&audio, b"RIFF").unwrap();

        let ex = extractor();
        assert!(matches!(
            ex.try_extract(&binary, "dat"),
            Err(IngestError::InvalidUtf8(_))
        ));
        assert!(matches!(
            ex.try_extract(&legacy, "doc"),
            Err(IngestError::LegacyFormat { modern: "docx", .. })
        ));
        assert!(ex.extract(&binary, "dat").is_empty());
        assert!(ex.extract(&legacy, "doc").is_empty());
        assert!(ex.extract(&audio, "wav").is_empty());
        assert!(ex.extract(Path::new("/nonexistent/file.txt"), "txt").is_empty());
    }

    #[test]
    fn test_extract_path_uses_file_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let segments = extractor().try_extract_path(&path).unwrap();
        assert_eq!(segments[0].metadata["format"], "csv");
    }

    #[test]
    fn test_legacy_office_files_suggest_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("minutes.doc");
        let ppt = dir.path().join("deck.PPT");
        std::fs::write(&doc, b"\xd0\xcf\x11\xe0").unwrap();
        std::fs::write(&ppt, b"\xd0\xcf\x11\xe0").unwrap();

        let ex = extractor();
        let doc_err = ex.try_extract_path(&doc).unwrap_err().to_string();
        let ppt_err = ex.try_extract_path(&ppt).unwrap_err().to_string();
        assert_eq!(
            doc_err,
            "Legacy .doc files are not supported; save it as .docx and upload again"
        );
        assert!(ppt_err.contains(".pptx"));
    }
}
