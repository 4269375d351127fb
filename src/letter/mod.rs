//! Cover letter synthesis
//!
//! The letter is a fixed template filled from the resume's skill terms, the
//! job title and the applicant's contact details, then rendered to PDF.

pub mod matchers;
pub mod render;
pub mod template;

use crate::config::Config;
use crate::error::Result;
use crate::processing::embeddings::EmbeddingHandle;
use crate::processing::gap_analyzer::KeywordGapAnalyzer;
use log::{info, warn};
use matchers::{job_title_chain, ContactInfo, MatcherChain, DEFAULT_JOB_TITLE};
use render::PdfRenderer;
use serde::Serialize;
use template::LetterFields;

pub const EMPTY_INPUT_MESSAGE: &str = "Please provide both resume and job description text.";
pub const INSUFFICIENT_TEXT_MESSAGE: &str = "Insufficient text to analyze.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverLetter {
    pub text: String,
    /// PDF bytes; `None` when rendering failed or no letter was written
    #[serde(skip)]
    pub document: Option<Vec<u8>>,
    pub job_title: Option<String>,
    pub contact: ContactInfo,
    pub matched_terms: Vec<String>,
    pub missing_terms: Vec<String>,
}

impl CoverLetter {
    fn message(text: &str) -> Self {
        Self {
            text: text.to_string(),
            document: None,
            job_title: None,
            contact: ContactInfo::default(),
            matched_terms: Vec::new(),
            missing_terms: Vec::new(),
        }
    }

    /// Whether a letter was written, as opposed to an input warning
    pub fn is_letter(&self) -> bool {
        self.job_title.is_some()
    }
}

pub struct CoverLetterSynthesizer {
    analyzer: KeywordGapAnalyzer,
    renderer: PdfRenderer,
    title_chain: MatcherChain<String>,
    max_matched_terms: usize,
    max_missing_terms: usize,
}

impl CoverLetterSynthesizer {
    pub fn new(config: &Config, embeddings: EmbeddingHandle) -> Self {
        Self {
            analyzer: KeywordGapAnalyzer::new(&config.matching, embeddings),
            renderer: PdfRenderer::new(&config.letter),
            title_chain: job_title_chain(),
            max_matched_terms: config.letter.max_matched_terms,
            max_missing_terms: config.letter.max_missing_terms,
        }
    }

    pub fn generate(&self, resume: &str, job_description: &str) -> Result<CoverLetter> {
        if resume.trim().is_empty() || job_description.trim().is_empty() {
            return Ok(CoverLetter::message(EMPTY_INPUT_MESSAGE));
        }

        let terms = self.analyzer.letter_terms(resume, job_description)?;
        if terms.is_insufficient() {
            return Ok(CoverLetter::message(INSUFFICIENT_TEXT_MESSAGE));
        }

        let job_title = self
            .title_chain
            .first_match(job_description)
            .unwrap_or_else(|| DEFAULT_JOB_TITLE.to_string());
        let contact = ContactInfo::extract(resume);

        // sets iterate alphabetically, so truncation keeps the first terms
        let matched_terms: Vec<String> = terms.matched.into_iter().take(self.max_matched_terms).collect();
        let missing_terms: Vec<String> = terms.missing.into_iter().take(self.max_missing_terms).collect();

        let text = template::compose(&LetterFields {
            job_title: &job_title,
            matched: &matched_terms,
            missing: &missing_terms,
            contact: &contact,
        });

        let document = match self.renderer.render(&text) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Cover letter PDF could not be rendered: {}", e);
                None
            }
        };

        info!(
            "Cover letter for {} with {} matched and {} missing terms",
            job_title,
            matched_terms.len(),
            missing_terms.len()
        );

        Ok(CoverLetter {
            text,
            document,
            job_title: Some(job_title),
            contact,
            matched_terms,
            missing_terms,
        })
    }
}
