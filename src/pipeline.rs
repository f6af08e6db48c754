//! Document analysis pipeline.
//!
//! Extraction → prompt → model call, one document at a time. Every failure
//! is converted into a [`DocumentOutcome`] here, so a bad document can never
//! abort its batch.

use std::sync::Arc;

use tracing::Instrument;

use crate::document::{AnalysisResult, DocumentOutcome, NamedOutcome, UploadedDocument};
use crate::llm::AnalysisClient;
use crate::pdf::{ExtractionError, PdfTextExtractor};
use crate::prompt::PromptBuilder;

/// Orchestrates analysis of uploaded documents.
///
/// Holds no per-document state; cloning is cheap.
#[derive(Debug, Clone)]
pub struct DocumentAnalysisPipeline {
    extractor: Arc<dyn PdfTextExtractor>,
    prompts: PromptBuilder,
    client: AnalysisClient,
}

impl DocumentAnalysisPipeline {
    /// Create a pipeline from its collaborators.
    #[must_use]
    pub fn new(extractor: Arc<dyn PdfTextExtractor>, client: AnalysisClient) -> Self {
        Self {
            extractor,
            prompts: PromptBuilder::new(),
            client,
        }
    }

    /// The analysis client in use.
    #[must_use]
    pub fn client(&self) -> &AnalysisClient {
        &self.client
    }

    /// Produce the outcome for a single document.
    pub async fn process(&self, doc: UploadedDocument) -> DocumentOutcome {
        let span = tracing::info_span!("document", name = %doc.name, size = doc.size());
        self.process_inner(doc).instrument(span).await
    }

    /// Process `docs` sequentially, returning outcomes in input order.
    pub async fn process_batch(&self, docs: Vec<UploadedDocument>) -> Vec<NamedOutcome> {
        let mut outcomes = Vec::with_capacity(docs.len());
        for doc in docs {
            let file_name = doc.name.clone();
            let outcome = self.process(doc).await;
            outcomes.push(NamedOutcome { file_name, outcome });
        }
        outcomes
    }

    async fn process_inner(&self, doc: UploadedDocument) -> DocumentOutcome {
        let text = match self.extract(doc.bytes).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(name: "document.outcome", outcome = "extraction_failed", error = %e, "Could not read PDF");
                return DocumentOutcome::ExtractionFailed(e.to_string());
            }
        };

        tracing::debug!(
            name: "document.extracted",
            extractor = self.extractor.name(),
            text_length = text.len(),
            "Text extracted"
        );

        if text.trim().is_empty() {
            tracing::info!(name: "document.outcome", outcome = "empty_content", "No text in document");
            return DocumentOutcome::EmptyContent;
        }

        let prompt = self.prompts.build(&text);
        let result = match self.client.analyze(&prompt).await {
            Ok(analysis) => AnalysisResult::Success(analysis),
            Err(e) => AnalysisResult::Failure(e.to_string()),
        };

        let outcome = DocumentOutcome::Analyzed(result);
        tracing::info!(name: "document.outcome", outcome = outcome.label(), "Document processed");
        outcome
    }

    /// Run the extractor on the blocking pool and wait for it.
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract(&bytes))
            .await
            .map_err(|e| ExtractionError::Malformed(format!("Extraction task failed: {e}")))?
    }
}
