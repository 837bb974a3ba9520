use std::path::PathBuf;
use thiserror::Error;

use crate::types::Stage;

#[derive(Error, Debug)]
pub enum TldwError {
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Failed to load config file {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    #[error("Source unavailable for {url}: {reason}")]
    SourceUnavailable { url: String, reason: String },

    #[error("Document is empty, nothing to summarize")]
    EmptyDocument,

    #[error("{stage} call #{index} failed: {reason}")]
    Backend {
        stage: Stage,
        index: usize,
        reason: String,
    },

    #[error("Translation to {language} failed: {reason}")]
    Translation { language: String, reason: String },

    #[error("Backend returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid backend response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("Summarization cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Coarse failure category shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    SourceUnavailable,
    Backend,
    Translation,
    Cancelled,
    Other,
}

impl TldwError {
    pub fn config(reason: impl Into<String>) -> Self {
        TldwError::Config {
            reason: reason.into(),
        }
    }

    pub fn source_unavailable(url: &str, reason: impl Into<String>) -> Self {
        TldwError::SourceUnavailable {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TldwError::Config { .. } | TldwError::ConfigFile { .. } => ErrorKind::Config,
            TldwError::MissingApiKey { .. } => ErrorKind::Config,
            TldwError::SourceUnavailable { .. } | TldwError::EmptyDocument => {
                ErrorKind::SourceUnavailable
            }
            TldwError::Backend { .. }
            | TldwError::Api { .. }
            | TldwError::InvalidResponse { .. }
            | TldwError::HttpError(_) => ErrorKind::Backend,
            TldwError::Translation { .. } => ErrorKind::Translation,
            TldwError::Cancelled => ErrorKind::Cancelled,
            TldwError::IoError(_) | TldwError::JsonError(_) => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, TldwError>;
