//! Embedding model management for downloading Model2Vec models

use crate::error::{Result, ScreenerError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files a local model directory needs before `StaticModel` can load it
const REQUIRED_FILES: [&str; 3] = ["model.safetensors", "tokenizer.json", "config.json"];
const OPTIONAL_FILES: [&str; 1] = ["README.md"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
    pub model_type: EmbeddingModelType,
    pub dimensions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EmbeddingModelType {
    Model2Vec,
    Potion,
}

impl EmbeddingModelInfo {
    /// Directory name under `models_dir`, the last segment of the repo id
    pub fn dir_name(&self) -> &str {
        self.repo_id.rsplit('/').next().unwrap_or(&self.repo_id)
    }
}

/// Catalog of known models plus what is already on disk
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: BTreeMap<String, EmbeddingModelInfo>,
    downloaded_models: HashSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&models_dir)
            .await
            .map_err(|e| ScreenerError::ModelError(format!("Failed to create models directory: {}", e)))?;

        let mut manager = Self {
            models_dir,
            available_models: Self::catalog(),
            downloaded_models: HashSet::new(),
        };

        manager.scan_downloaded_models().await;

        Ok(manager)
    }

    fn catalog() -> BTreeMap<String, EmbeddingModelInfo> {
        let mut models = BTreeMap::new();

        models.insert(
            "potion-base-8M".to_string(),
            EmbeddingModelInfo {
                name: "Potion Base 8M".to_string(),
                repo_id: "minishlab/potion-base-8M".to_string(),
                size_mb: 33,
                description: "Default model, good quality for its size".to_string(),
                model_type: EmbeddingModelType::Potion,
                dimensions: 256,
            },
        );

        models.insert(
            "m2v-base".to_string(),
            EmbeddingModelInfo {
                name: "Model2Vec Base".to_string(),
                repo_id: "minishlab/M2V_base_output".to_string(),
                size_mb: 90,
                description: "Fallback model".to_string(),
                model_type: EmbeddingModelType::Model2Vec,
                dimensions: 256,
            },
        );

        models.insert(
            "m2v-large".to_string(),
            EmbeddingModelInfo {
                name: "Model2Vec Large".to_string(),
                repo_id: "minishlab/M2V_large_output".to_string(),
                size_mb: 250,
                description: "Larger vocabulary, slower to load".to_string(),
                model_type: EmbeddingModelType::Model2Vec,
                dimensions: 512,
            },
        );

        models
    }

    async fn scan_downloaded_models(&mut self) {
        for (id, info) in &self.available_models {
            if Self::is_complete_model_dir(&self.models_dir.join(info.dir_name())).await {
                self.downloaded_models.insert(id.clone());
            }
        }
    }

    async fn is_complete_model_dir(path: &Path) -> bool {
        for file in REQUIRED_FILES {
            if fs::metadata(path.join(file)).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Download a model from the Hugging Face Hub into `models_dir`
    pub async fn download_model(&mut self, input: &str, force: bool) -> Result<PathBuf> {
        let model_id = self
            .resolve_model_id(input)
            .ok_or_else(|| ScreenerError::ModelNotFound(input.to_string()))?;
        let model_info = self.available_models[&model_id].clone();
        let model_dir = self.models_dir.join(model_info.dir_name());

        if !force && self.downloaded_models.contains(&model_id) {
            info!("{} is already downloaded", model_info.name);
            return Ok(model_dir);
        }

        info!(
            "Downloading embedding model: {} ({} MB) from {}",
            model_info.name, model_info.size_mb, model_info.repo_id
        );

        fs::create_dir_all(&model_dir)
            .await
            .map_err(|e| ScreenerError::ModelError(format!("Failed to create model directory: {}", e)))?;

        let api = Api::new().map_err(|e| ScreenerError::ModelError(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.model(model_info.repo_id.clone());

        for file in REQUIRED_FILES.iter().chain(OPTIONAL_FILES.iter()) {
            match repo.get(file).await {
                Ok(cached_path) => {
                    fs::copy(&cached_path, model_dir.join(file))
                        .await
                        .map_err(|e| ScreenerError::ModelError(format!("Failed to copy {}: {}", file, e)))?;
                    info!("Downloaded {}", file);
                }
                Err(e) if OPTIONAL_FILES.contains(file) => {
                    warn!("Optional file {} not found: {}", file, e);
                }
                Err(e) => {
                    return Err(ScreenerError::ModelError(format!(
                        "Failed to download required file {}: {}",
                        file, e
                    )));
                }
            }
        }

        self.downloaded_models.insert(model_id);
        Ok(model_dir)
    }

    pub fn get_model_path(&self, input: &str) -> Option<PathBuf> {
        let model_id = self.resolve_model_id(input)?;
        if self.downloaded_models.contains(&model_id) {
            Some(self.models_dir.join(self.available_models[&model_id].dir_name()))
        } else {
            None
        }
    }

    /// Catalog entries sorted by key, each with its download state
    pub fn list_models(&self) -> Vec<(&str, &EmbeddingModelInfo, bool)> {
        self.available_models
            .iter()
            .map(|(id, info)| (id.as_str(), info, self.downloaded_models.contains(id)))
            .collect()
    }

    pub fn get_model_info(&self, input: &str) -> Option<&EmbeddingModelInfo> {
        self.resolve_model_id(input)
            .and_then(|id| self.available_models.get(&id))
    }

    pub fn is_model_downloaded(&self, input: &str) -> bool {
        self.resolve_model_id(input)
            .map(|id| self.downloaded_models.contains(&id))
            .unwrap_or(false)
    }

    /// Accepts a catalog key, a repo id or a display name
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if self.available_models.contains_key(input) {
            return Some(input.to_string());
        }

        let input_lower = input.to_lowercase();
        self.available_models
            .iter()
            .find(|(_, info)| info.repo_id == input || info.name.to_lowercase() == input_lower)
            .map(|(id, _)| id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_manager_creation_creates_dir() {
        let temp_dir = TempDir::new().unwrap();
        let models_dir = temp_dir.path().join("nested").join("models");
        let manager = EmbeddingModelManager::new(models_dir.clone()).await.unwrap();

        assert!(models_dir.exists());
        assert_eq!(manager.list_models().len(), 3);
        assert!(manager.list_models().iter().all(|(_, _, downloaded)| !downloaded));
    }

    #[tokio::test]
    async fn test_resolve_model_id() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();

        assert_eq!(manager.resolve_model_id("potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("minishlab/M2V_base_output"), Some("m2v-base".to_string()));
        assert_eq!(manager.resolve_model_id("potion base 8m"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("gpt-2"), None);
    }

    #[tokio::test]
    async fn test_scan_finds_complete_model_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let complete = temp_dir.path().join("potion-base-8M");
        std::fs::create_dir_all(&complete).unwrap();
        for file in REQUIRED_FILES {
            std::fs::write(complete.join(file), b"x").unwrap();
        }
        let partial = temp_dir.path().join("M2V_base_output");
        std::fs::create_dir_all(&partial).unwrap();
        std::fs::write(partial.join("tokenizer.json"), b"{}").unwrap();

        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();

        assert!(manager.is_model_downloaded("minishlab/potion-base-8M"));
        assert!(!manager.is_model_downloaded("m2v-base"));
        assert_eq!(manager.get_model_path("potion-base-8M"), Some(complete));
        assert_eq!(manager.get_model_path("m2v-base"), None);
    }

    #[tokio::test]
    async fn test_download_unknown_model() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();

        let result = manager.download_model("not-a-model", false).await;
        assert!(matches!(result, Err(ScreenerError::ModelNotFound(_))));
    }
}
