//! Shared helpers for the integration suite

use resume_screener::config::Config;
use resume_screener::error::Result;
use resume_screener::processing::analyzer::AnalysisEngine;
use resume_screener::processing::embeddings::{EmbeddingHandle, EmbeddingProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DIMENSIONS: usize = 4096;

/// Deterministic stand-in for a static embedding model: every word is
/// padded as `^word$` and its character trigrams are hashed into a bag.
/// Words sharing spelling land close together, unrelated words are orthogonal.
pub struct TrigramEmbedder;

fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

impl EmbeddingProvider for TrigramEmbedder {
    fn model_name(&self) -> &str {
        "trigram-test"
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; DIMENSIONS];
                let lower = text.to_lowercase();
                for word in lower.split(|c: char| !c.is_ascii_alphanumeric()).filter(|w| !w.is_empty()) {
                    let padded: Vec<char> = format!("^{}$", word).chars().collect();
                    for window in padded.windows(3) {
                        let trigram: String = window.iter().collect();
                        vector[(fnv1a(&trigram) % DIMENSIONS as u64) as usize] += 1.0;
                    }
                }
                vector
            })
            .collect())
    }
}

pub fn trigram_handle() -> EmbeddingHandle {
    EmbeddingHandle::from_provider(Arc::new(TrigramEmbedder))
}

pub fn engine() -> AnalysisEngine {
    AnalysisEngine::with_embeddings(&Config::default(), trigram_handle())
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}
