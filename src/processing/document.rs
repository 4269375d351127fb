//! Document structures

use crate::error::Result;
use crate::input::ExtractedText;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extracted text of one upload. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    content: String,
    source: String,
    kind: DocumentKind,
    word_count: usize,
    character_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Resume,
    JobDescription,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>, kind: DocumentKind) -> Self {
        let content = content.into();
        let word_count = content.split_whitespace().count();
        let character_count = content.chars().count();

        Self {
            content,
            source: source.into(),
            kind,
            word_count,
            character_count,
        }
    }

    /// Build from an extraction outcome; a failed extraction is an error here
    pub fn from_extracted(extracted: ExtractedText, source: impl Into<String>, kind: DocumentKind) -> Result<Self> {
        let content = extracted.into_result()?;
        Ok(Self::new(content, source, kind))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// First `max_chars` characters, cut back to a word boundary
    pub fn preview(&self, max_chars: usize) -> String {
        if self.character_count <= max_chars {
            return self.content.clone();
        }

        let truncated: String = self.content.chars().take(max_chars).collect();
        let cut = truncated.rfind(char::is_whitespace).unwrap_or(truncated.len());
        format!("{}...", &truncated[..cut])
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Resume => write!(f, "Resume"),
            DocumentKind::JobDescription => write!(f, "Job description"),
        }
    }
}
