use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    config::LlmConfig,
    error::{Result, TldwError},
    prompt::{PromptKind, render},
};

/// One call into a text-generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub source_text: String,
    pub prompt_kind: PromptKind,
    pub temperature: f32,
}

/// A backend that turns a chunk (or a batch of summaries) into summary text.
///
/// Implementations make a single request; retries belong to the adapter, never
/// to the caller.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, request: &SummaryRequest) -> impl Future<Output = Result<String>> + Send;

    fn name(&self) -> &str;
}

/// Adapter for any OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            model: model.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Build a client from the `[llm]` config section, reading the provider's key.
    pub fn from_config(llm: &LlmConfig, timeout: Duration) -> Result<Self> {
        let preset = llm.provider.config();
        let api_url = llm.base_url.as_deref().unwrap_or(preset.api_url);
        let model = llm.model.as_deref().unwrap_or(preset.model);
        Self::new(api_url, model)
            .with_api_key(llm.provider.api_key()?)
            .with_timeout(timeout)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Summarizer for ChatCompletionsClient {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        let prompt = render(request.prompt_kind, &request.source_text);

        let mut builder = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt,
                    },
                ],
                "temperature": request.temperature,
                "stream": false,
            }));
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to reach summarizer backend"))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TldwError::Api { status, message });
        }

        let body = response.json::<serde_json::Value>().await?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| TldwError::InvalidResponse {
                reason: format!("no message content in {}", body),
            })?;

        Ok(content.to_string())
    }

    fn name(&self) -> &str {
        &self.model
    }
}
