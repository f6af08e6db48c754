//! The analysis client: one prompt in, one analysis (or one error) out.

use std::sync::Arc;

use super::{ChatCompletionsDriver, GeminiDriver, LlmDriver, LlmSettings};
use crate::config::SystemStatus;

/// Response returned for every prompt while no API key is configured.
pub const OFFLINE_ANALYSIS: &str = "\
**Executive Summary:**
This is a simulated executive summary. The content of the PDF would be concisely summarized here, highlighting the key findings, main arguments, and overall purpose of the document. This section is designed for quick consumption by busy stakeholders.

---

**In-depth Analysis:**
This is a simulated in-depth analysis. In a real scenario, this section would provide a detailed breakdown of the document's content. It would explore the primary topics, methodologies, and conclusions presented in the PDF. Key points would be elaborated upon, and a critical perspective might be offered on the document's strengths, weaknesses, and implications. For example, it could include:
- **Main Arguments:** A bulleted list or detailed paragraphs on the core arguments.
- **Evidence and Data:** Analysis of the data or evidence used to support the claims.
- **Potential Biases:** Identification of any potential biases or limitations.
- **Conclusion and Recommendations:** A deeper look at the document's conclusions and any actionable recommendations.
";

/// Failure of a single model call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Transport, authentication, quota, or malformed-response failure.
    #[error("An error occurred while calling the model API: {0}")]
    Request(String),
}

#[derive(Clone)]
enum Mode {
    Offline,
    Online(Arc<dyn LlmDriver>),
}

/// Client used by the pipeline to obtain analyses.
///
/// Whether the client is online is fixed at construction.
#[derive(Clone)]
pub struct AnalysisClient {
    mode: Mode,
}

impl std::fmt::Debug for AnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.mode {
            Mode::Offline => f.debug_struct("AnalysisClient").field("mode", &"offline").finish(),
            Mode::Online(driver) => f
                .debug_struct("AnalysisClient")
                .field("mode", &"online")
                .field("driver", driver)
                .finish(),
        }
    }
}

impl AnalysisClient {
    /// Build a client from settings.
    ///
    /// Without an API key the client is offline and no driver is created.
    pub fn from_settings(settings: &LlmSettings) -> anyhow::Result<Self> {
        if settings.api_key.is_none() {
            return Ok(Self::offline());
        }

        let driver: Arc<dyn LlmDriver> = if settings.provider.uses_gemini_protocol() {
            Arc::new(GeminiDriver::new(settings.clone())?)
        } else {
            Arc::new(ChatCompletionsDriver::new(settings.clone())?)
        };

        Ok(Self::with_driver(driver))
    }

    /// A client that always answers with [`OFFLINE_ANALYSIS`].
    #[must_use]
    pub fn offline() -> Self {
        Self { mode: Mode::Offline }
    }

    /// An online client backed by `driver`.
    #[must_use]
    pub fn with_driver(driver: Arc<dyn LlmDriver>) -> Self {
        Self {
            mode: Mode::Online(driver),
        }
    }

    /// Whether calls are answered locally.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        matches!(self.mode, Mode::Offline)
    }

    /// Credential status as seen by this client.
    #[must_use]
    pub fn status(&self) -> SystemStatus {
        if self.is_offline() {
            SystemStatus::CredentialAbsent
        } else {
            SystemStatus::CredentialConfigured
        }
    }

    /// Obtain an analysis for `prompt`.
    ///
    /// Never retries. Driver failures are returned as [`AnalysisError`]
    /// with the full cause chain in the message.
    pub async fn analyze(&self, prompt: &str) -> Result<String, AnalysisError> {
        let driver = match &self.mode {
            Mode::Offline => return Ok(OFFLINE_ANALYSIS.to_string()),
            Mode::Online(driver) => driver,
        };

        tracing::debug!(
            name: "analysis.request",
            prompt_length = prompt.len(),
            "Sending prompt to model"
        );

        driver.generate(prompt).await.map_err(|e| {
            let message = format!("{e:#}");
            tracing::warn!(name: "analysis.failed", error = %message, "Model call failed");
            AnalysisError::Request(message)
        })
    }
}
