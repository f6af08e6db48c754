//! Google Gemini `generateContent` driver.

use anyhow::{Context, bail};

use super::{LlmDriver, LlmSettings, http_client, read_json};

/// Driver for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for GeminiDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl GeminiDriver {
    /// Create a new Gemini driver with the given settings.
    pub fn new(settings: LlmSettings) -> anyhow::Result<Self> {
        Ok(Self {
            http: http_client(&settings)?,
            settings,
        })
    }
}

#[async_trait::async_trait]
impl LlmDriver for GeminiDriver {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let url = self
            .settings
            .provider
            .build_url(&self.settings.base_url, &self.settings.model);

        let body = serde_json::json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ]
        });

        let mut rb = self.http.post(&url).json(&body);
        if let Some(k) = &self.settings.api_key {
            rb = rb.header("x-goog-api-key", k.expose());
        }

        let resp = rb.send().await.context("Request to Gemini API failed")?;
        let v = read_json(resp).await?;
        parse_response(&v)
    }
}

/// Pull the text of the first candidate out of a `generateContent` response.
pub(crate) fn parse_response(v: &serde_json::Value) -> anyhow::Result<String> {
    if let Some(reason) = v["promptFeedback"]["blockReason"].as_str() {
        bail!("Prompt was blocked by the model (reason: {reason})");
    }

    let Some(candidate) = v["candidates"].get(0) else {
        bail!("Response contained no candidates");
    };

    let text: String = candidate["content"]["parts"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|p| p["text"].as_str())
        .collect();

    if text.is_empty() {
        let finish = candidate["finishReason"].as_str().unwrap_or("unknown");
        bail!("Response contained no text (finish reason: {finish})");
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_joins_parts() {
        let v = json!({
            "candidates": [{
                "content": { "parts": [ { "text": "Executive " }, { "text": "Summary" } ] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(parse_response(&v).unwrap(), "Executive Summary");
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let v = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = parse_response(&v).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_parse_no_candidates() {
        let err = parse_response(&json!({})).unwrap_err();
        assert!(err.to_string().contains("no candidates"));
    }

    #[test]
    fn test_parse_empty_candidate() {
        let v = json!({ "candidates": [ { "finishReason": "MAX_TOKENS" } ] });
        let err = parse_response(&v).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }
}
