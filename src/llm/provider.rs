//! Provider-specific configuration and detection.
//!
//! This module handles differences between model API providers, including
//! URL patterns and which wire protocol they speak.

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini (generativelanguage.googleapis.com)
    Gemini,
    /// `OpenAI` (api.openai.com)
    OpenAI,
    /// `OpenRouter` (openrouter.ai)
    OpenRouter,
    /// Groq (groq.com)
    Groq,
    /// Generic OpenAI-compatible provider
    Generic,
}

impl Provider {
    /// Detect provider from base URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pdf_analyzer::llm::Provider;
    ///
    /// let provider = Provider::detect_from_url("https://generativelanguage.googleapis.com");
    /// assert_eq!(provider, Provider::Gemini);
    /// ```
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        let lower = base_url.to_lowercase();

        if lower.contains("generativelanguage.googleapis.com") {
            Self::Gemini
        } else if lower.contains("openrouter.ai") {
            Self::OpenRouter
        } else if lower.contains("groq.com") {
            Self::Groq
        } else if lower.contains("openai.com") {
            Self::OpenAI
        } else {
            Self::Generic
        }
    }

    /// Whether this provider speaks the Gemini `generateContent` protocol
    /// rather than Chat Completions.
    #[must_use]
    pub fn uses_gemini_protocol(self) -> bool {
        matches!(self, Self::Gemini)
    }

    /// Short name used in logs and the status endpoint.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
            Self::OpenRouter => "openrouter",
            Self::Groq => "groq",
            Self::Generic => "generic",
        }
    }

    /// Build the generation URL for this provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL (trailing slash is ignored)
    /// * `model` - The model name (only part of the path for Gemini)
    #[must_use]
    pub fn build_url(self, base_url: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');

        match self {
            Self::Gemini => format!("{base}/v1beta/models/{model}:generateContent"),
            Self::Groq => format!("{base}/openai/v1/chat/completions"),
            Self::OpenRouter => format!("{base}/api/v1/chat/completions"),
            Self::OpenAI | Self::Generic => format!("{base}/v1/chat/completions"),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
