//! Input manager for reading uploads from disk or pasted text

use crate::error::{Result, ScreenerError};
use crate::input::text_extractor::{self, ExtractedText, Upload};
use log::info;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

pub struct InputManager {
    cache: HashMap<String, String>,
    max_file_bytes: u64,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            max_file_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Read a file into an upload, enforcing the size limit
    pub async fn read_upload(&self, path: &Path) -> Result<Upload> {
        if !path.exists() {
            return Err(ScreenerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let size = fs::metadata(path).await?.len();
        if size > self.max_file_bytes {
            return Err(ScreenerError::InvalidInput(format!(
                "{} is {} bytes, above the {} byte limit",
                path.display(),
                size,
                self.max_file_bytes
            )));
        }

        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Ok(Upload::new(name, bytes))
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<ExtractedText> {
        let path_str = path.to_string_lossy().to_string();

        if let Some(cached_text) = self.cache.get(&path_str) {
            info!("Using cached text for: {}", path.display());
            return Ok(ExtractedText::Text(cached_text.clone()));
        }

        let upload = self.read_upload(path).await?;
        info!("Extracting {} text from: {}", upload.file_type(), path.display());
        let extracted = text_extractor::extract(Some(&upload));

        // Failures are not cached so a fixed file is re-read
        if let ExtractedText::Text(text) = &extracted {
            self.cache.insert(path_str, text.clone());
        }

        Ok(extracted)
    }

    /// Pasted text wins over a file, as in the upload form
    pub async fn resolve(&mut self, pasted: Option<&str>, path: Option<&Path>) -> Result<ExtractedText> {
        if let Some(text) = pasted.filter(|t| !t.trim().is_empty()) {
            return Ok(ExtractedText::Text(text.to_string()));
        }

        match path {
            Some(path) => self.extract_text(path).await,
            None => Ok(ExtractedText::empty()),
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
