use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TldwError},
    provider::Provider,
};

/// Smallest chunk size the form and CLI accept.
pub const MIN_CHUNK_SIZE: usize = 200;

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
    pub translation: TranslationConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    /// Overrides the provider's chat-completions URL.
    pub base_url: Option<String>,
}

/// Parameters of one summarization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum tokens per chunk.
    pub chunk_size: usize,
    /// Tokens repeated from the end of the previous chunk.
    pub overlap_size: usize,
    pub temperature: f32,
    pub target_language: String,
    /// Maximum summed tokens of the partial summaries in one combine call.
    pub combine_budget: usize,
    /// Maximum partial summaries in one combine call.
    pub max_combine_batch: usize,
    /// Backend calls in flight at once.
    pub concurrency: usize,
    pub request_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5000,
            overlap_size: 100,
            temperature: 0.3,
            target_language: "English".to_string(),
            combine_budget: 6000,
            max_combine_batch: 8,
            concurrency: 4,
            request_timeout_ms: 300_000,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(TldwError::config(format!(
                "chunk size must be at least {} tokens, got {}",
                MIN_CHUNK_SIZE, self.chunk_size
            )));
        }
        if self.overlap_size >= self.chunk_size {
            return Err(TldwError::config(format!(
                "overlap size ({}) must be smaller than chunk size ({})",
                self.overlap_size, self.chunk_size
            )));
        }
        if !self.temperature.is_finite() || !(0.0..=1.0).contains(&self.temperature) {
            return Err(TldwError::config(format!(
                "temperature must be between 0 and 1, got {}",
                self.temperature
            )));
        }
        if self.combine_budget == 0 {
            return Err(TldwError::config("combine budget must be greater than zero"));
        }
        if self.max_combine_batch < 2 {
            return Err(TldwError::config(format!(
                "max combine batch must be at least 2, got {}",
                self.max_combine_batch
            )));
        }
        if self.concurrency == 0 {
            return Err(TldwError::config("concurrency must be at least 1"));
        }
        if self.request_timeout_ms == 0 {
            return Err(TldwError::config("request timeout must be greater than zero"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub endpoint: String,
    pub max_chars_per_request: usize,
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            max_chars_per_request: 4500,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub yt_dlp_path: String,
    /// Subtitle languages tried by yt-dlp, in order.
    pub subtitle_languages: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            subtitle_languages: vec!["en".to_string(), "en-US".to_string(), "en-GB".to_string()],
            timeout_secs: 120,
        }
    }
}

impl Config {
    /// `<config_dir>/tldw/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tldw").join("config.toml"))
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| TldwError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&contents).map_err(|e| TldwError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| TldwError::config(e.to_string()))
    }

    /// Load the file at `path` (or the default location) and apply `TLDW_*`
    /// environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => match Self::default_path() {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `TLDW_*` overrides read through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("TLDW_PROVIDER") {
            self.llm.provider = v.parse()?;
        }
        if let Some(v) = lookup("TLDW_MODEL") {
            self.llm.model = Some(v);
        }
        if let Some(v) = lookup("TLDW_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Some(v) = lookup("TLDW_CHUNK_SIZE") {
            self.pipeline.chunk_size = parse_env("TLDW_CHUNK_SIZE", &v)?;
        }
        if let Some(v) = lookup("TLDW_OVERLAP_SIZE") {
            self.pipeline.overlap_size = parse_env("TLDW_OVERLAP_SIZE", &v)?;
        }
        if let Some(v) = lookup("TLDW_TEMPERATURE") {
            self.pipeline.temperature = parse_env("TLDW_TEMPERATURE", &v)?;
        }
        if let Some(v) = lookup("TLDW_LANGUAGE") {
            self.pipeline.target_language = v;
        }
        if let Some(v) = lookup("TLDW_CONCURRENCY") {
            self.pipeline.concurrency = parse_env("TLDW_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("TLDW_REQUEST_TIMEOUT_MS") {
            self.pipeline.request_timeout_ms = parse_env("TLDW_REQUEST_TIMEOUT_MS", &v)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TldwError::config(format!("{} has invalid value '{}'", key, value)))
}
