//! Report structures produced by the analysis commands

use crate::letter::CoverLetter;
use crate::processing::gap_analyzer::{GapReport, LexicalDiff};
use crate::processing::scorer::RankedResume;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Keywords listed by the analytics dashboard
pub const ANALYTICS_TERM_LIMIT: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub resume_source: String,
    pub job_source: String,
    pub embedding_model: String,
    pub processing_time_ms: u64,
}

impl ReportMetadata {
    pub fn new(resume_source: &str, job_source: &str, embedding_model: &str, processing_time_ms: u64) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            resume_source: resume_source.to_string(),
            job_source: job_source.to_string(),
            embedding_model: embedding_model.to_string(),
            processing_time_ms,
        }
    }
}

/// Applicant view: score, keyword diff, gap report and optionally a letter
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub metadata: ReportMetadata,
    /// Document similarity in percent
    pub ats_score: f64,
    pub keywords: LexicalDiff,
    pub gap_report: GapReport,
    pub cover_letter: Option<CoverLetter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermFrequency {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub metadata: ReportMetadata,
    pub similarity: f64,
    pub keyword_overlap_percent: f64,
    /// Alphabetical, at most [`ANALYTICS_TERM_LIMIT`]
    pub missing_keywords: Vec<String>,
    pub top_resume_terms: Vec<TermFrequency>,
    pub resume_word_count: usize,
    pub job_word_count: usize,
}

/// An upload left out of the ranking because it could not be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedResume {
    pub name: String,
    pub reason: String,
}

/// Recruiter view
#[derive(Debug, Clone, Serialize)]
pub struct RankingReport {
    pub generated_at: DateTime<Utc>,
    pub job_source: String,
    pub embedding_model: String,
    pub rankings: Vec<RankedResume>,
    pub skipped: Vec<SkippedResume>,
}
