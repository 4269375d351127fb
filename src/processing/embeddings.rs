//! Embeddings generation using Model2Vec

use crate::config::ModelConfig;
use crate::error::{Result, ScreenerError};
use log::{info, warn};
use model2vec_rs::model::StaticModel;
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Turns texts into fixed-length vectors: one per input, in input order.
pub trait EmbeddingProvider: Send + Sync {
    fn model_name(&self) -> &str;

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn encode_single(&self, text: &str) -> Result<Vec<f32>> {
        self.encode(&[text.to_string()])?
            .pop()
            .ok_or_else(|| ScreenerError::Embedding("provider returned no vector".to_string()))
    }
}

pub struct StaticEmbedder {
    model: StaticModel,
    model_name: String,
    batch_size: usize,
    max_tokens: usize,
}

impl StaticEmbedder {
    /// Load one model by id. A directory of that name under `models_dir`
    /// wins over the Hugging Face repo of the same id.
    pub fn load(model_id: &str, config: &ModelConfig) -> Result<Self> {
        let start_time = Instant::now();
        let source = Self::resolve_source(model_id, config);

        info!("Loading Model2Vec embedding model from: {}", source);

        let model = StaticModel::from_pretrained(&source, None, None, None)
            .map_err(|e| ScreenerError::ModelLoading(format!("{}: {}", model_id, e)))?;

        info!("Model {} loaded in {:.2?}", model_id, start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_id.to_string(),
            batch_size: config.batch_size.max(1),
            max_tokens: config.max_tokens,
        })
    }

    /// Primary model, then the fallback once
    pub fn load_with_fallback(config: &ModelConfig) -> Result<Self> {
        load_first(
            &config.primary_embedding_model,
            &config.fallback_embedding_model,
            |model_id| Self::load(model_id, config),
        )
    }

    fn resolve_source(model_id: &str, config: &ModelConfig) -> String {
        Self::local_candidates(model_id, config)
            .into_iter()
            .find(|dir| dir.join("tokenizer.json").exists())
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_else(|| model_id.to_string())
    }

    /// `models_dir/<id>` and `models_dir/<repo name>`
    fn local_candidates(model_id: &str, config: &ModelConfig) -> Vec<PathBuf> {
        let mut candidates = vec![config.models_dir.join(model_id)];
        if let Some(repo_name) = model_id.rsplit('/').next() {
            candidates.push(config.models_dir.join(repo_name));
        }
        candidates
    }
}

/// Try `primary`, then `fallback` exactly once. Both failing is a
/// `ModelLoading` error carrying both causes.
pub fn load_first<T>(primary: &str, fallback: &str, load: impl Fn(&str) -> Result<T>) -> Result<T> {
    match load(primary) {
        Ok(loaded) => Ok(loaded),
        Err(primary_err) => {
            warn!(
                "Primary embedding model unavailable ({}), falling back to {}",
                primary_err, fallback
            );
            load(fallback).map_err(|fallback_err| {
                ScreenerError::ModelLoading(format!(
                    "no embedding model could be loaded (primary: {}; fallback: {})",
                    primary_err, fallback_err
                ))
            })
        }
    }
}

impl EmbeddingProvider for StaticEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self
            .model
            .encode_with_args(texts, Some(self.max_tokens), self.batch_size);

        if vectors.len() != texts.len() {
            return Err(ScreenerError::Embedding(format!(
                "expected {} vectors, model returned {}",
                texts.len(),
                vectors.len()
            )));
        }

        Ok(vectors)
    }
}

type Loader = Box<dyn Fn() -> Result<Arc<dyn EmbeddingProvider>> + Send + Sync>;

struct HandleInner {
    provider: OnceCell<Arc<dyn EmbeddingProvider>>,
    loader: Loader,
}

/// Shared, lazily loaded embedding model.
///
/// The loader runs on first use only; clones share the loaded provider.
/// A failed load is not cached, so the next call retries.
#[derive(Clone)]
pub struct EmbeddingHandle {
    inner: Arc<HandleInner>,
}

impl EmbeddingHandle {
    pub fn lazy(config: ModelConfig) -> Self {
        Self::with_loader(move || {
            let embedder = StaticEmbedder::load_with_fallback(&config)?;
            Ok(Arc::new(embedder) as Arc<dyn EmbeddingProvider>)
        })
    }

    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn EmbeddingProvider>> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(HandleInner {
                provider: OnceCell::new(),
                loader: Box::new(loader),
            }),
        }
    }

    /// Wrap an already constructed provider
    pub fn from_provider(provider: Arc<dyn EmbeddingProvider>) -> Self {
        let handle = Self::with_loader(|| {
            Err(ScreenerError::ModelLoading("provider handle has no loader".to_string()))
        });
        let _ = handle.inner.provider.set(provider);
        handle
    }

    pub fn provider(&self) -> Result<&Arc<dyn EmbeddingProvider>> {
        self.inner.provider.get_or_try_init(|| (self.inner.loader)())
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.provider.get().is_some()
    }

    /// Name of the loaded model; never triggers a load
    pub fn loaded_model_name(&self) -> Option<&str> {
        self.inner.provider.get().map(|p| p.model_name())
    }

    pub fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.provider()?.encode(texts)
    }
}

impl fmt::Debug for EmbeddingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingHandle")
            .field("model", &self.inner.provider.get().map(|p| p.model_name().to_string()))
            .finish()
    }
}

/// Cosine of the angle between two vectors; 0 when either has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ScreenerError::Processing(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

/// `rows.len() x cols.len()` matrix of pairwise cosines
pub fn similarity_matrix(rows: &[Vec<f32>], cols: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
    rows.iter()
        .map(|row| cols.iter().map(|col| cosine_similarity(row, col)).collect())
        .collect()
}
