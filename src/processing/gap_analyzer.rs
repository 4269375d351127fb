//! Keyword gap analysis between a resume and a job description
//!
//! Three passes share one tokenizer:
//! - a lexical diff of the token sets (no model),
//! - a semantic classification of every job token against the resume,
//! - the letter pass, which looks at resume skill terms from the other side.

use crate::config::MatchingConfig;
use crate::error::Result;
use crate::processing::embeddings::{similarity_matrix, EmbeddingHandle};
use crate::processing::scorer::{round1, round2};
use crate::processing::text_processor::{TextProcessor, TokenSet};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Cap on missing keywords shown to a user; the full set is kept
pub const MISSING_DISPLAY_LIMIT: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LexicalDiff {
    pub matched: BTreeSet<String>,
    pub missing: BTreeSet<String>,
    pub overlap_percent: f64,
}

impl LexicalDiff {
    /// Alphabetical, at most [`MISSING_DISPLAY_LIMIT`] entries
    pub fn display_missing(&self) -> Vec<&str> {
        self.missing
            .iter()
            .take(MISSING_DISPLAY_LIMIT)
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrength {
    StrongMatch,
    PartialMatch,
    Missing,
}

impl fmt::Display for MatchStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrength::StrongMatch => write!(f, "Strong Match"),
            MatchStrength::PartialMatch => write!(f, "Partial Match"),
            MatchStrength::Missing => write!(f, "Missing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermClassification {
    pub term: String,
    /// Best cosine against any resume token, as a percentage with one decimal
    pub similarity: f64,
    pub strength: MatchStrength,
}

/// A 0..1 threshold in the percent scale of [`TermClassification::similarity`]
pub fn threshold_percent(threshold: f32) -> f64 {
    round1(f64::from(threshold) * 100.0)
}

/// Job terms ordered by similarity, highest first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GapReport {
    pub terms: Vec<TermClassification>,
}

impl GapReport {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn count(&self, strength: MatchStrength) -> usize {
        self.terms.iter().filter(|t| t.strength == strength).count()
    }

    pub fn with_strength(&self, strength: MatchStrength) -> impl Iterator<Item = &TermClassification> {
        self.terms.iter().filter(move |t| t.strength == strength)
    }
}

/// Resume skill terms split by how well the job description covers them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LetterTerms {
    pub matched: BTreeSet<String>,
    pub missing: BTreeSet<String>,
    pub resume_terms: usize,
    pub job_terms: usize,
}

impl LetterTerms {
    /// Either side had no skill terms left after filtering
    pub fn is_insufficient(&self) -> bool {
        self.resume_terms == 0 || self.job_terms == 0
    }
}

pub struct KeywordGapAnalyzer {
    processor: TextProcessor,
    config: MatchingConfig,
    embeddings: EmbeddingHandle,
}

impl KeywordGapAnalyzer {
    pub fn new(config: &MatchingConfig, embeddings: EmbeddingHandle) -> Self {
        Self {
            processor: TextProcessor::new(config),
            config: config.clone(),
            embeddings,
        }
    }

    pub fn processor(&self) -> &TextProcessor {
        &self.processor
    }

    pub fn lexical_diff(&self, resume: &str, job_description: &str) -> LexicalDiff {
        let resume_tokens = self.processor.token_set(resume);
        let job_tokens = self.processor.token_set(job_description);

        let matched = job_tokens.intersection(&resume_tokens);
        let missing = job_tokens.difference(&resume_tokens);
        let overlap_percent = if job_tokens.is_empty() {
            0.0
        } else {
            round2(matched.len() as f64 / job_tokens.len() as f64 * 100.0)
        };

        LexicalDiff {
            matched,
            missing,
            overlap_percent,
        }
    }

    /// Classify every job token by its closest resume token
    pub fn analyze(&self, resume: &str, job_description: &str) -> Result<GapReport> {
        let resume_tokens = self.processor.token_set(resume);
        let job_tokens = self.processor.token_set(job_description);

        if resume_tokens.is_empty() || job_tokens.is_empty() {
            debug!("Empty token set, gap report is empty");
            return Ok(GapReport::default());
        }

        let best = self.best_similarities(&job_tokens, &resume_tokens)?;
        let strong = threshold_percent(self.config.strong_threshold);
        let partial = threshold_percent(self.config.partial_threshold);

        let mut terms: Vec<TermClassification> = job_tokens
            .iter()
            .zip(best)
            .map(|(term, cosine)| {
                // banded on the recorded value so a shown 70.0 is never Partial
                let similarity = round1(f64::from(cosine) * 100.0);
                let strength = if similarity >= strong {
                    MatchStrength::StrongMatch
                } else if similarity >= partial {
                    MatchStrength::PartialMatch
                } else {
                    MatchStrength::Missing
                };
                TermClassification {
                    term: term.clone(),
                    similarity,
                    strength,
                }
            })
            .collect();

        // stable: equal similarities keep first-occurrence order
        terms.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        Ok(GapReport { terms })
    }

    /// Resume skill terms the job asks for, and those it only brushes against
    pub fn letter_terms(&self, resume: &str, job_description: &str) -> Result<LetterTerms> {
        let resume_terms = self.processor.skill_terms(resume);
        let job_terms = self.processor.skill_terms(job_description);

        let mut letter_terms = LetterTerms {
            resume_terms: resume_terms.len(),
            job_terms: job_terms.len(),
            ..LetterTerms::default()
        };

        if letter_terms.is_insufficient() {
            return Ok(letter_terms);
        }

        let best = self.best_similarities(&resume_terms, &job_terms)?;
        let matched_above = self.config.letter_match_threshold;
        let partial_from = self.config.partial_threshold;

        for (term, similarity) in resume_terms.iter().zip(best) {
            if similarity > matched_above {
                letter_terms.matched.insert(term.clone());
            } else if similarity >= partial_from {
                letter_terms.missing.insert(term.clone());
            }
        }

        Ok(letter_terms)
    }

    /// For each token of `targets`, its highest cosine against `against`
    fn best_similarities(&self, targets: &TokenSet, against: &TokenSet) -> Result<Vec<f32>> {
        let target_vecs = self.embeddings.encode(&targets.to_vec())?;
        let against_vecs = self.embeddings.encode(&against.to_vec())?;
        let matrix = similarity_matrix(&target_vecs, &against_vecs)?;

        Ok(matrix
            .into_iter()
            .map(|row| row.into_iter().fold(f32::NEG_INFINITY, f32::max))
            .collect())
    }
}
