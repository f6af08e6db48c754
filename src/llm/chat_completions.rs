//! OpenAI Chat Completions API driver.
//!
//! This module implements the [`LlmDriver`] trait for OpenAI-compatible
//! `/v1/chat/completions` endpoints with a single, non-streaming request.

use anyhow::{Context, bail};

use super::{LlmDriver, LlmSettings, http_client, read_json};

/// Driver for OpenAI-compatible Chat Completions APIs.
#[derive(Clone)]
pub struct ChatCompletionsDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsDriver {
    /// Create a new Chat Completions driver with the given settings.
    pub fn new(settings: LlmSettings) -> anyhow::Result<Self> {
        Ok(Self {
            http: http_client(&settings)?,
            settings,
        })
    }
}

#[async_trait::async_trait]
impl LlmDriver for ChatCompletionsDriver {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let url = self
            .settings
            .provider
            .build_url(&self.settings.base_url, &self.settings.model);

        let body = serde_json::json!({
            "model": self.settings.model,
            "stream": false,
            "messages": [ { "role": "user", "content": prompt } ],
        });

        let mut rb = self.http.post(&url).json(&body);
        if let Some(k) = &self.settings.api_key {
            rb = rb.bearer_auth(k.expose());
        }

        let resp = rb.send().await.context("Request to chat completions API failed")?;
        let v = read_json(resp).await?;
        parse_response(&v)
    }
}

/// Pull the assistant message out of a chat completions response.
pub(crate) fn parse_response(v: &serde_json::Value) -> anyhow::Result<String> {
    let choice = &v["choices"][0];
    match choice["message"]["content"].as_str() {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => {
            let finish = choice["finish_reason"].as_str().unwrap_or("unknown");
            bail!("Response contained no message content (finish reason: {finish})")
        }
    }
}
