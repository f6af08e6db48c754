//! Per-document data model.
//!
//! An [`UploadedDocument`] enters the pipeline and exactly one
//! [`DocumentOutcome`] comes out. Nothing here is persisted.

use serde::{Deserialize, Serialize};

/// A file received from the upload form.
///
/// The name is for display only and is not guaranteed to be unique within
/// a batch.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    /// Display name as supplied by the client.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Create a new uploaded document.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl std::fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Result of a single model invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum AnalysisResult {
    /// The model's response, verbatim.
    Success(String),
    /// Human-readable description of why the call failed.
    Failure(String),
}

/// The unit rendered to the user for one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// Text was extracted and the model was called.
    Analyzed(AnalysisResult),
    /// The PDF parsed but yielded no text (blank, image-only, ...).
    EmptyContent,
    /// The bytes could not be parsed as a PDF.
    ExtractionFailed(String),
}

impl DocumentOutcome {
    /// Whether this outcome carries a successful analysis.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Analyzed(AnalysisResult::Success(_)))
    }

    /// Short label used in logs and the JSON API.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Analyzed(AnalysisResult::Success(_)) => "analyzed",
            Self::Analyzed(AnalysisResult::Failure(_)) => "analysis_failed",
            Self::EmptyContent => "empty_content",
            Self::ExtractionFailed(_) => "extraction_failed",
        }
    }
}

/// A document's name paired with its outcome, in batch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedOutcome {
    /// Display name of the source document.
    pub file_name: String,
    /// What happened to it.
    pub outcome: DocumentOutcome,
}
