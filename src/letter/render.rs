//! Plain-text letter to PDF

use crate::config::LetterConfig;
use crate::error::{Result, ScreenerError};
use log::{debug, warn};
use once_cell::sync::Lazy;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use regex::{Captures, Regex};
use thiserror::Error;

/// Longest run of non-space characters left unbroken
pub const MAX_UNBROKEN_RUN: usize = 60;

const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph advance in em, generous for capitals
const HELVETICA_AVG_ADVANCE: f32 = 0.55;

static NON_ASCII: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x00-\x7F]+").expect("Invalid ASCII regex"));
static LONG_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\S{{{},}}", MAX_UNBROKEN_RUN)).expect("Invalid long run regex")
});

#[derive(Error, Debug, PartialEq)]
pub enum LayoutError {
    #[error("word of {length} characters does not fit a {width} character line")]
    WordTooWide { length: usize, width: usize },
}

/// Replace non-ASCII with spaces and hard-break very long tokens
pub fn sanitize(text: &str) -> String {
    let ascii = NON_ASCII.replace_all(text, " ");
    LONG_RUN
        .replace_all(&ascii, |caps: &Captures| {
            let chars: Vec<char> = caps[0].chars().collect();
            chars
                .chunks(MAX_UNBROKEN_RUN)
                .map(|chunk| chunk.iter().collect::<String>())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .into_owned()
}

/// Greedy word wrap of one line. An empty line stays one empty row.
pub fn wrap_line(line: &str, width: usize) -> std::result::Result<Vec<String>, LayoutError> {
    let mut rows = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let length = word.chars().count();
        if length > width {
            return Err(LayoutError::WordTooWide { length, width });
        }

        let current_len = current.chars().count();
        if current.is_empty() {
            current.push_str(word);
        } else if current_len + 1 + length <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            rows.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    rows.push(current);
    Ok(rows)
}

/// Wrap every line; a line that cannot be wrapped is cut to the width
pub fn layout(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();

    for line in text.lines() {
        match wrap_line(line, width) {
            Ok(wrapped) => rows.extend(wrapped),
            Err(e) => {
                warn!("Truncating letter line: {}", e);
                rows.push(line.trim().chars().take(width).collect());
            }
        }
    }

    rows
}

pub struct PdfRenderer {
    config: LetterConfig,
}

impl PdfRenderer {
    pub fn new(config: &LetterConfig) -> Self {
        Self { config: config.clone() }
    }

    pub fn chars_per_line(&self) -> usize {
        let usable = self.config.page_width_mm - 2.0 * self.config.margin_mm;
        let advance = self.config.font_size_pt * PT_TO_MM * HELVETICA_AVG_ADVANCE;
        ((usable / advance).floor() as usize).max(1)
    }

    pub fn lines_per_page(&self) -> usize {
        let usable = self.config.page_height_mm - 2.0 * self.config.margin_mm;
        ((usable / self.config.line_height_mm).floor() as usize).max(1)
    }

    /// Sanitized, wrapped rows as they will be drawn
    pub fn layout(&self, text: &str) -> Vec<String> {
        layout(&sanitize(text), self.chars_per_line())
    }

    pub fn render(&self, text: &str) -> Result<Vec<u8>> {
        let rows = self.layout(text);
        let per_page = self.lines_per_page();
        let width = Mm(self.config.page_width_mm);
        let height = Mm(self.config.page_height_mm);
        let top = self.config.page_height_mm - self.config.margin_mm - self.config.font_size_pt * PT_TO_MM;

        let (doc, page, layer) = PdfDocument::new("Cover Letter", width, height, "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ScreenerError::Rendering(e.to_string()))?;

        let mut current_layer = doc.get_page(page).get_layer(layer);
        for (index, row) in rows.iter().enumerate() {
            if index > 0 && index % per_page == 0 {
                let (next_page, next_layer) = doc.add_page(width, height, "Layer 1");
                current_layer = doc.get_page(next_page).get_layer(next_layer);
            }
            if row.is_empty() {
                continue;
            }

            let y = top - (index % per_page) as f32 * self.config.line_height_mm;
            current_layer.use_text(row.as_str(), self.config.font_size_pt, Mm(self.config.margin_mm), Mm(y), &font);
        }

        debug!(
            "Rendered {} rows on {} page(s)",
            rows.len(),
            rows.len().div_ceil(per_page).max(1)
        );

        doc.save_to_bytes()
            .map_err(|e| ScreenerError::Rendering(e.to_string()))
    }
}
