//! Analysis engine coordinating the scorer, gap analyzer and letter writer

use crate::config::Config;
use crate::error::Result;
use crate::letter::{CoverLetter, CoverLetterSynthesizer};
use crate::output::report::{AnalyticsReport, MatchReport, ReportMetadata, TermFrequency, ANALYTICS_TERM_LIMIT};
use crate::processing::document::Document;
use crate::processing::embeddings::EmbeddingHandle;
use crate::processing::gap_analyzer::KeywordGapAnalyzer;
use crate::processing::scorer::{RankedResume, SimilarityScorer};
use indicatif::ProgressBar;
use log::info;
use std::time::Instant;

const MODEL_NOT_LOADED: &str = "not loaded";

pub struct AnalysisEngine {
    embeddings: EmbeddingHandle,
    scorer: SimilarityScorer,
    gap_analyzer: KeywordGapAnalyzer,
    synthesizer: CoverLetterSynthesizer,
}

impl AnalysisEngine {
    /// Engine with the configured model, loaded on first use
    pub fn new(config: &Config) -> Self {
        Self::with_embeddings(config, EmbeddingHandle::lazy(config.models.clone()))
    }

    pub fn with_embeddings(config: &Config, embeddings: EmbeddingHandle) -> Self {
        Self {
            scorer: SimilarityScorer::new(embeddings.clone()),
            gap_analyzer: KeywordGapAnalyzer::new(&config.matching, embeddings.clone()),
            synthesizer: CoverLetterSynthesizer::new(config, embeddings.clone()),
            embeddings,
        }
    }

    pub fn embeddings(&self) -> &EmbeddingHandle {
        &self.embeddings
    }

    fn model_label(&self) -> &str {
        self.embeddings.loaded_model_name().unwrap_or(MODEL_NOT_LOADED)
    }

    /// Applicant view of one resume against one job description
    pub fn analyze_match(&self, resume: &Document, job: &Document, with_letter: bool) -> Result<MatchReport> {
        let start_time = Instant::now();

        let ats_score = self.scorer.score(resume.content(), job.content())?;
        let keywords = self.gap_analyzer.lexical_diff(resume.content(), job.content());
        let gap_report = self.gap_analyzer.analyze(resume.content(), job.content())?;
        let cover_letter = if with_letter {
            Some(self.synthesizer.generate(resume.content(), job.content())?)
        } else {
            None
        };

        let elapsed = start_time.elapsed().as_millis() as u64;
        info!(
            "Match analysis done in {}ms: score {:.2}%, {} job terms classified",
            elapsed,
            ats_score,
            gap_report.len()
        );

        Ok(MatchReport {
            metadata: ReportMetadata::new(resume.source(), job.source(), self.model_label(), elapsed),
            ats_score,
            keywords,
            gap_report,
            cover_letter,
        })
    }

    /// Dashboard metrics: similarity, keyword overlap, gaps and term frequency
    pub fn analytics(&self, resume: &Document, job: &Document) -> Result<AnalyticsReport> {
        let start_time = Instant::now();

        let similarity = self.scorer.score(resume.content(), job.content())?;
        let diff = self.gap_analyzer.lexical_diff(resume.content(), job.content());
        let missing_keywords = diff.missing.iter().take(ANALYTICS_TERM_LIMIT).cloned().collect();
        let top_resume_terms = self
            .gap_analyzer
            .processor()
            .term_frequencies(resume.content(), ANALYTICS_TERM_LIMIT)
            .into_iter()
            .map(|(term, count)| TermFrequency { term, count })
            .collect();

        let elapsed = start_time.elapsed().as_millis() as u64;

        Ok(AnalyticsReport {
            metadata: ReportMetadata::new(resume.source(), job.source(), self.model_label(), elapsed),
            similarity,
            keyword_overlap_percent: diff.overlap_percent,
            missing_keywords,
            top_resume_terms,
            resume_word_count: resume.word_count(),
            job_word_count: job.word_count(),
        })
    }

    pub fn cover_letter(&self, resume: &Document, job: &Document) -> Result<CoverLetter> {
        self.synthesizer.generate(resume.content(), job.content())
    }

    /// Recruiter view: every resume scored against the job, best first
    pub fn rank(&self, resumes: &[Document], job: &Document, progress: Option<&ProgressBar>) -> Result<Vec<RankedResume>> {
        let named: Vec<(String, String)> = resumes
            .iter()
            .map(|doc| (doc.source().to_string(), doc.content().to_string()))
            .collect();

        self.scorer.rank(&named, job.content(), progress)
    }

    /// Model name for report metadata, after any analysis has run
    pub fn model_name(&self) -> String {
        self.model_label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScreenerError;
    use crate::processing::document::DocumentKind;
    use crate::processing::embeddings::EmbeddingProvider;
    use std::sync::Arc;

    /// Bag of first letters: words sharing an initial are similar
    struct InitialEmbedder;

    impl EmbeddingProvider for InitialEmbedder {
        fn model_name(&self) -> &str {
            "initials"
        }

        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; 26];
                    for word in t.split_whitespace() {
                        if let Some(c) = word.chars().next().filter(char::is_ascii_alphabetic) {
                            v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
                        }
                    }
                    v
                })
                .collect())
        }
    }

    fn engine() -> AnalysisEngine {
        AnalysisEngine::with_embeddings(&Config::default(), EmbeddingHandle::from_provider(Arc::new(InitialEmbedder)))
    }

    fn resume(text: &str) -> Document {
        Document::new(text, "resume.txt", DocumentKind::Resume)
    }

    fn job(text: &str) -> Document {
        Document::new(text, "job.txt", DocumentKind::JobDescription)
    }

    #[test]
    fn test_analyze_match() {
        let report = engine()
            .analyze_match(
                &resume("Python SQL Excel dashboards"),
                &job("Python SQL Tableau reporting"),
                false,
            )
            .unwrap();

        assert!(report.ats_score > 0.0 && report.ats_score <= 100.0);
        assert!(report.keywords.matched.contains("python"));
        assert!(report.keywords.missing.contains("tableau"));
        assert_eq!(report.gap_report.len(), 4);
        assert!(report.cover_letter.is_none());
        assert_eq!(report.metadata.embedding_model, "initials");
    }

    #[test]
    fn test_analyze_match_with_letter() {
        let report = engine()
            .analyze_match(&resume("Jane Doe\nPython SQL"), &job("Data Analyst: Python and SQL"), true)
            .unwrap();

        let letter = report.cover_letter.unwrap();
        assert!(letter.is_letter());
        assert!(letter.text.contains("Jane Doe"));
    }

    #[test]
    fn test_analytics_limits_and_order() {
        let job_text: String = (0..30).map(|i| format!("need{:02} ", i)).collect();
        let report = engine()
            .analytics(&resume("sql sql python sql python excel"), &job(&job_text))
            .unwrap();

        assert_eq!(report.missing_keywords.len(), ANALYTICS_TERM_LIMIT);
        assert_eq!(report.missing_keywords[0], "need00");
        assert_eq!(report.keyword_overlap_percent, 0.0);
        assert_eq!(
            report.top_resume_terms[0],
            TermFrequency {
                term: "sql".to_string(),
                count: 3
            }
        );
        assert_eq!(report.resume_word_count, 6);
    }

    #[test]
    fn test_rank_documents() {
        let resumes = vec![
            Document::new("zebra zoo", "z.txt", DocumentKind::Resume),
            Document::new("python pandas", "p.txt", DocumentKind::Resume),
        ];
        let ranked = engine().rank(&resumes, &job("python programming"), None).unwrap();

        assert_eq!(ranked[0].name, "p.txt");
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn test_model_failure_propagates() {
        let handle = EmbeddingHandle::with_loader(|| Err(ScreenerError::ModelLoading("offline".to_string())));
        let engine = AnalysisEngine::with_embeddings(&Config::default(), handle);

        let result = engine.analyze_match(&resume("python"), &job("python"), false);
        assert!(matches!(result, Err(ScreenerError::ModelLoading(_))));

        // blank input never needs the model
        let blank = engine.analyze_match(&resume(""), &job("python"), false).unwrap();
        assert_eq!(blank.ats_score, 0.0);
        assert_eq!(blank.metadata.embedding_model, MODEL_NOT_LOADED);
    }
}
