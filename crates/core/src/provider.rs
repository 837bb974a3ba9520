use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TldwError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Ollama,
    Grok,
    Openai,
    Gemini,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    /// `None` for local backends that take no key.
    pub env_var: Option<&'static str>,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Ollama => ProviderConfig {
                api_url: "http://localhost:11434/v1/chat/completions",
                model: "llama3",
                env_var: None,
            },
            Provider::Grok => ProviderConfig {
                api_url: "https://api.x.ai/v1/chat/completions",
                model: "grok-4-fast",
                env_var: Some("XAI_API_KEY"),
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                model: "gpt-5.1",
                env_var: Some("OPENAI_API_KEY"),
            },
            Provider::Gemini => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
                model: "gemini-3-pro",
                env_var: Some("GEMINI_API_KEY"),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama => "Ollama",
            Provider::Grok => "Grok",
            Provider::Openai => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }

    /// Read the API key for this provider, if it needs one.
    pub fn api_key(&self) -> Result<Option<String>> {
        let Some(env_var) = self.config().env_var else {
            return Ok(None);
        };
        std::env::var(env_var)
            .map(Some)
            .map_err(|_| TldwError::MissingApiKey {
                env_var: env_var.to_string(),
            })
    }
}

impl FromStr for Provider {
    type Err = TldwError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "grok" | "xai" => Ok(Provider::Grok),
            "openai" => Ok(Provider::Openai),
            "gemini" => Ok(Provider::Gemini),
            other => Err(TldwError::config(format!("unknown provider '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_needs_no_key() {
        assert_eq!(Provider::Ollama.api_key().unwrap(), None);
        assert!(Provider::Ollama.config().api_url.starts_with("http://localhost"));
    }

    #[test]
    fn parses_names() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::Openai);
        assert_eq!("xai".parse::<Provider>().unwrap(), Provider::Grok);
        assert!("mystery".parse::<Provider>().is_err());
    }
}
