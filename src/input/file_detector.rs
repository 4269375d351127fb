//! File type detection

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Docx,
    Text,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "docx" => FileType::Docx,
            "txt" => FileType::Text,
            _ => FileType::Unknown,
        }
    }

    /// Detect from an upload name such as `Resume.PDF`
    pub fn from_name(name: &str) -> Self {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileType::Unknown)
    }

    pub fn supported_extensions() -> &'static [&'static str] {
        &["pdf", "docx", "txt"]
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Pdf => write!(f, "PDF"),
            FileType::Docx => write!(f, "DOCX"),
            FileType::Text => write!(f, "TXT"),
            FileType::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_is_case_insensitive() {
        assert_eq!(FileType::from_name("cv.PDF"), FileType::Pdf);
        assert_eq!(FileType::from_name("cv.Docx"), FileType::Docx);
        assert_eq!(FileType::from_name("notes.txt"), FileType::Text);
    }

    #[test]
    fn test_unrecognized_names() {
        assert_eq!(FileType::from_name("resume.md"), FileType::Unknown);
        assert_eq!(FileType::from_name("resume"), FileType::Unknown);
        assert_eq!(FileType::from_name("archive.pdf.zip"), FileType::Unknown);
    }
}
