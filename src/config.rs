//! Configuration management for the resume screener

use crate::error::{Result, ScreenerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub matching: MatchingConfig,
    pub letter: LetterConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub primary_embedding_model: String,
    pub fallback_embedding_model: String,
    pub batch_size: usize,
    pub max_tokens: usize,
}

/// Thresholds and token filtering for the keyword gap analysis.
///
/// Similarity thresholds are cosine values in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub strong_threshold: f32,
    pub partial_threshold: f32,
    /// Resume terms above this are foregrounded in the cover letter
    pub letter_match_threshold: f32,
    pub min_token_length: usize,
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterConfig {
    pub max_matched_terms: usize,
    pub max_missing_terms: usize,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub font_size_pt: f32,
    pub line_height_mm: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub max_file_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strong_threshold: 0.7,
            partial_threshold: 0.4,
            letter_match_threshold: 0.65,
            min_token_length: 3,
            extra_stopwords: Vec::new(),
        }
    }
}

impl Default for LetterConfig {
    fn default() -> Self {
        // A4 portrait
        Self {
            max_matched_terms: 12,
            max_missing_terms: 8,
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 15.0,
            font_size_pt: 11.0,
            line_height_mm: 7.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-screener")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                primary_embedding_model: "minishlab/potion-base-8M".to_string(),
                fallback_embedding_model: "minishlab/M2V_base_output".to_string(),
                batch_size: 1024,
                max_tokens: 512,
            },
            matching: MatchingConfig::default(),
            letter: LetterConfig::default(),
            input: InputConfig {
                max_file_bytes: 10 * 1024 * 1024,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl MatchingConfig {
    /// Check that the thresholds describe ordered bands inside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !in_unit(self.strong_threshold)
            || !in_unit(self.partial_threshold)
            || !in_unit(self.letter_match_threshold)
        {
            return Err(ScreenerError::Configuration(
                "similarity thresholds must lie in [0, 1]".to_string(),
            ));
        }
        if self.partial_threshold > self.strong_threshold {
            return Err(ScreenerError::Configuration(format!(
                "partial_threshold ({}) must not exceed strong_threshold ({})",
                self.partial_threshold, self.strong_threshold
            )));
        }
        if self.partial_threshold > self.letter_match_threshold {
            return Err(ScreenerError::Configuration(format!(
                "partial_threshold ({}) must not exceed letter_match_threshold ({})",
                self.partial_threshold, self.letter_match_threshold
            )));
        }
        if self.min_token_length == 0 {
            return Err(ScreenerError::Configuration(
                "min_token_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ScreenerError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.matching.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-screener")
            .join("config.toml")
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_thresholds_are_valid() {
        let config = Config::default();
        assert!(config.matching.validate().is_ok());
        assert_eq!(config.matching.strong_threshold, 0.7);
        assert_eq!(config.matching.partial_threshold, 0.4);
        assert_eq!(config.matching.min_token_length, 3);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let matching = MatchingConfig {
            strong_threshold: 0.3,
            partial_threshold: 0.5,
            ..MatchingConfig::default()
        };
        assert!(matches!(matching.validate(), Err(ScreenerError::Configuration(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.matching.letter_match_threshold = 0.7;
        config.matching.extra_stopwords = vec!["synergy".to_string()];
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.matching.letter_match_threshold, 0.7);
        assert_eq!(reloaded.matching.extra_stopwords, vec!["synergy".to_string()]);
        assert_eq!(reloaded.output.format, OutputFormat::Console);
    }

    #[test]
    fn test_malformed_file_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "models = 3").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ScreenerError::Configuration(_))));
    }
}
