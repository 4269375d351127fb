//! Whole-document similarity scoring

use crate::error::{Result, ScreenerError};
use crate::processing::embeddings::{cosine_similarity, EmbeddingHandle};
use indicatif::ProgressBar;
use log::debug;
use serde::{Deserialize, Serialize};

/// One row of the recruiter table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResume {
    pub name: String,
    pub score: f64,
}

pub struct SimilarityScorer {
    embeddings: EmbeddingHandle,
}

impl SimilarityScorer {
    pub fn new(embeddings: EmbeddingHandle) -> Self {
        Self { embeddings }
    }

    /// Cosine similarity of the two documents as a percentage, two decimals.
    ///
    /// Blank input scores 0.0 without touching the model. Negative scores are
    /// kept as they are.
    pub fn score(&self, resume: &str, job_description: &str) -> Result<f64> {
        if resume.trim().is_empty() || job_description.trim().is_empty() {
            debug!("Blank document, skipping embedding");
            return Ok(0.0);
        }

        let vectors = self
            .embeddings
            .encode(&[resume.to_string(), job_description.to_string()])?;
        let [resume_vec, job_vec] = vectors.as_slice() else {
            return Err(ScreenerError::Embedding(format!(
                "expected 2 document vectors, got {}",
                vectors.len()
            )));
        };

        let similarity = cosine_similarity(resume_vec, job_vec)?;
        Ok(round2(f64::from(similarity) * 100.0))
    }

    /// Score every resume against one job description, best first.
    /// Equal scores keep their input order.
    pub fn rank(
        &self,
        resumes: &[(String, String)],
        job_description: &str,
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<RankedResume>> {
        let mut ranked = Vec::with_capacity(resumes.len());

        for (name, text) in resumes {
            if let Some(pb) = progress {
                pb.set_message(name.clone());
            }

            let score = self.score(text, job_description)?;
            debug!("{} scored {:.2}%", name, score);
            ranked.push(RankedResume {
                name: name.clone(),
                score,
            });

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::EmbeddingProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Vector of (letter a count, letter b count)
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl EmbeddingProvider for CountingEmbedder {
        fn model_name(&self) -> &str {
            "counting"
        }

        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    vec![
                        t.matches('a').count() as f32,
                        t.matches('b').count() as f32,
                    ]
                })
                .collect())
        }
    }

    fn scorer() -> (SimilarityScorer, Arc<CountingEmbedder>) {
        let embedder = Arc::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
        });
        let handle = EmbeddingHandle::from_provider(embedder.clone());
        (SimilarityScorer::new(handle), embedder)
    }

    #[test]
    fn test_blank_input_skips_model() {
        let (scorer, embedder) = scorer();

        assert_eq!(scorer.score("", "aaa").unwrap(), 0.0);
        assert_eq!(scorer.score("aaa", "  \n\t").unwrap(), 0.0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_identical_documents_score_100() {
        let (scorer, embedder) = scorer();

        assert_eq!(scorer.score("ab", "ab").unwrap(), 100.0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_score_is_rounded_to_two_decimals() {
        let (scorer, _) = scorer();

        // cos = 1 / sqrt(2)
        let score = scorer.score("a", "ab").unwrap();
        assert_eq!(score, 70.71);
    }

    #[test]
    fn test_orthogonal_documents_score_zero() {
        let (scorer, _) = scorer();
        assert_eq!(scorer.score("aaa", "bbb").unwrap(), 0.0);
    }

    #[test]
    fn test_rank_sorts_descending_and_is_stable() {
        let (scorer, _) = scorer();
        let resumes = vec![
            ("first.txt".to_string(), "bbb".to_string()),
            ("second.txt".to_string(), "aab".to_string()),
            ("third.txt".to_string(), "aaa".to_string()),
            ("fourth.txt".to_string(), "aab".to_string()),
        ];

        let ranked = scorer.rank(&resumes, "a", None).unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["third.txt", "second.txt", "fourth.txt", "first.txt"]);
        assert_eq!(ranked[0].score, 100.0);
        assert_eq!(ranked[3].score, 0.0);
    }

    #[test]
    fn test_rank_with_empty_job_description() {
        let (scorer, embedder) = scorer();
        let resumes = vec![("only.txt".to_string(), "aaa".to_string())];

        let ranked = scorer.rank(&resumes, "", None).unwrap();
        assert_eq!(ranked[0].score, 0.0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(58.256), 58.26);
        assert_eq!(round2(-12.344), -12.34);
    }
}
