//! Text extraction from uploaded documents
//!
//! Extraction never fails outward: a corrupt PDF or DOCX becomes
//! [`ExtractedText::Failed`], an unknown extension or a missing upload
//! becomes empty text.

use crate::error::{Result, ScreenerError};
use crate::input::file_detector::FileType;
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::panic;

/// An uploaded artifact: a file name carrying the extension, and its bytes
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_type(&self) -> FileType {
        FileType::from_name(&self.name)
    }
}

/// Outcome of extracting an upload. Keeps "valid but empty" apart from
/// "could not be read".
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedText {
    Text(String),
    Failed { format: FileType, reason: String },
}

impl ExtractedText {
    pub fn empty() -> Self {
        ExtractedText::Text(String::new())
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractedText::Failed { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ExtractedText::Text(text) => Some(text),
            ExtractedText::Failed { .. } => None,
        }
    }

    /// Inline marker form, e.g. `[Error reading PDF: <cause>]`
    pub fn into_pipeline_text(self) -> String {
        match self {
            ExtractedText::Text(text) => text,
            ExtractedText::Failed { format, reason } => format!("[Error reading {}: {}]", format, reason),
        }
    }

    pub fn into_result(self) -> Result<String> {
        match self {
            ExtractedText::Text(text) => Ok(text),
            ExtractedText::Failed { format: FileType::Docx, reason } => Err(ScreenerError::DocxExtraction(reason)),
            ExtractedText::Failed { reason, .. } => Err(ScreenerError::PdfExtraction(reason)),
        }
    }
}

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed inputs
        let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map_err(|_| ScreenerError::PdfExtraction("malformed PDF structure".to_string()))?
            .map_err(|e| ScreenerError::PdfExtraction(e.to_string()))?;

        debug!("Extracted {} PDF pages", pages.len());
        Ok(pages.join(" "))
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ScreenerError::DocxExtraction(e.to_string()))?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| ScreenerError::DocxExtraction(e.to_string()))?
            .read_to_string(&mut xml)?;

        Self::document_text(&xml)
    }
}

impl DocxExtractor {
    /// Collect `<w:t>` runs; paragraphs end with a newline
    fn document_text(xml: &str) -> Result<String> {
        let mut reader = Reader::from_str(xml);
        let mut text = String::new();
        let mut in_run_text = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run_text = true,
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"w:t" => in_run_text = false,
                    b"w:p" => text.push('\n'),
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"w:tab" => text.push('\t'),
                    b"w:br" | b"w:cr" => text.push('\n'),
                    _ => {}
                },
                Ok(Event::Text(t)) if in_run_text => {
                    let run = t
                        .unescape()
                        .map_err(|e| ScreenerError::DocxExtraction(e.to_string()))?;
                    text.push_str(&run);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ScreenerError::DocxExtraction(format!(
                        "malformed document.xml at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
        }

        Ok(text.trim_end().to_string())
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Dispatch an upload to its extractor by extension
pub fn extract(upload: Option<&Upload>) -> ExtractedText {
    let Some(upload) = upload else {
        return ExtractedText::empty();
    };

    let file_type = upload.file_type();
    let result = match file_type {
        FileType::Pdf => PdfExtractor.extract(&upload.bytes),
        FileType::Docx => DocxExtractor.extract(&upload.bytes),
        FileType::Text => PlainTextExtractor.extract(&upload.bytes),
        FileType::Unknown => {
            debug!("Ignoring upload with unrecognized extension: {}", upload.name);
            return ExtractedText::empty();
        }
    };

    match result {
        Ok(text) => ExtractedText::Text(text),
        Err(e) => {
            warn!("Could not read {} '{}': {}", file_type, upload.name, e);
            let reason = match e {
                ScreenerError::PdfExtraction(reason) | ScreenerError::DocxExtraction(reason) => reason,
                other => other.to_string(),
            };
            ExtractedText::Failed {
                format: file_type,
                reason,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_upload_is_empty() {
        assert_eq!(extract(None), ExtractedText::Text(String::new()));
    }

    #[test]
    fn test_unknown_extension_is_empty() {
        let upload = Upload::new("resume.odt", b"some content".to_vec());
        assert_eq!(extract(Some(&upload)), ExtractedText::Text(String::new()));
    }

    #[test]
    fn test_txt_replaces_invalid_utf8() {
        let upload = Upload::new("NOTES.TXT", vec![b'S', b'Q', b'L', 0xFF, b'!']);
        let text = extract(Some(&upload)).into_pipeline_text();
        assert_eq!(text, "SQL\u{FFFD}!");
    }

    #[test]
    fn test_zero_byte_uploads_never_panic() {
        for name in ["empty.pdf", "empty.docx", "empty.txt"] {
            let upload = Upload::new(name, Vec::new());
            let extracted = extract(Some(&upload));
            // txt is valid-but-empty, binary formats report a failure
            let _ = extracted.clone().into_pipeline_text();
            if name.ends_with(".txt") {
                assert_eq!(extracted, ExtractedText::empty());
            } else {
                assert!(extracted.is_failed());
            }
        }
    }

    #[test]
    fn test_corrupt_pdf_marker() {
        let upload = Upload::new("broken.pdf", b"%PDF-1.4 not really a pdf".to_vec());
        let text = extract(Some(&upload)).into_pipeline_text();
        assert!(text.starts_with("[Error reading PDF: "));
        assert!(text.ends_with(']'));
    }

    #[test]
    fn test_corrupt_docx_maps_to_docx_error() {
        let upload = Upload::new("broken.docx", b"PK definitely not a zip".to_vec());
        let extracted = extract(Some(&upload));
        assert!(matches!(extracted.into_result(), Err(ScreenerError::DocxExtraction(_))));
    }

    #[test]
    fn test_document_xml_paragraphs_and_entities() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>JANE DOE</w:t></w:r></w:p>
            <w:p><w:r><w:t xml:space="preserve">Rust &amp; </w:t></w:r><w:r><w:tab/><w:t>SQL</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let text = DocxExtractor::document_text(xml).unwrap();
        assert_eq!(text, "JANE DOE\nRust & \tSQL");
    }
}
