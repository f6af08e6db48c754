//! Model API drivers and the analysis client.
//!
//! # Overview
//!
//! The [`LlmDriver`] trait is the single-call interface every backend
//! implements: one prompt in, the model's text out. The
//! [`AnalysisClient`] sits on top and decides, once at construction, whether
//! it talks to a driver at all or answers from its offline placeholder.
//!
//! # Drivers
//!
//! - [`GeminiDriver`]: Google Gemini `generateContent`
//! - [`ChatCompletionsDriver`]: OpenAI-compatible `/v1/chat/completions`
//!
//! # Example
//!
//! ```rust,ignore
//! use pdf_analyzer::llm::{AnalysisClient, LlmSettings};
//!
//! let client = AnalysisClient::from_settings(&settings)?;
//! let text = client.analyze(&prompt).await?;
//! ```

pub mod chat_completions;
pub mod client;
pub mod gemini;
pub mod provider;

pub use chat_completions::ChatCompletionsDriver;
pub use client::{AnalysisClient, AnalysisError, OFFLINE_ANALYSIS};
pub use gemini::GeminiDriver;
pub use provider::Provider;

use std::time::Duration;

use anyhow::{Context, bail};

use crate::config::Credential;

/// Model connection settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Base URL for the model API.
    pub base_url: String,
    /// API key; `None` puts the client in offline mode.
    pub api_key: Option<Credential>,
    /// Model identifier (e.g., `gemini-2.5-pro`).
    pub model: String,
    /// Provider type (auto-detected from `base_url`).
    pub provider: Provider,
    /// Per-call HTTP timeout.
    pub request_timeout: Duration,
}

impl LlmSettings {
    /// Settings for `base_url` with the provider detected from the URL.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<Credential>,
    ) -> Self {
        let base_url = base_url.into();
        let provider = Provider::detect_from_url(&base_url);
        Self {
            base_url,
            api_key,
            model: model.into(),
            provider,
            request_timeout: Duration::from_secs(300),
        }
    }
}

/// Trait for model drivers.
///
/// A driver performs exactly one request per call and never retries.
#[async_trait::async_trait]
pub trait LlmDriver: Send + Sync + std::fmt::Debug {
    /// Send `prompt` and return the model's text response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or the
    /// response carries no text.
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Build a `reqwest` client honoring the configured timeout.
pub(crate) fn http_client(settings: &LlmSettings) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Read a JSON body, turning non-success statuses into errors that carry the
/// API's own message when it sends one.
pub(crate) async fn read_json(resp: reqwest::Response) -> anyhow::Result<serde_json::Value> {
    let status = resp.status();
    let body = resp.text().await.context("Failed to read response body")?;

    if !status.is_success() {
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(ToString::to_string))
            .unwrap_or(body);
        bail!("API returned {status}: {}", detail.trim());
    }

    serde_json::from_str(&body).context("Malformed JSON in model response")
}
