//! PDF Analyzer
//!
//! Upload PDF documents through a web form, extract their text, and ask a
//! generative model for an executive summary and an in-depth analysis of
//! each one.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server rendering plain HTML
//! - **Pipeline**: extraction → prompt → model call, one document at a time
//! - **LLM Drivers**: Gemini `generateContent` and OpenAI-compatible Chat Completions
//!
//! # Modules
//!
//! - [`pdf`]: PDF text extraction
//! - [`prompt`]: Analysis prompt template
//! - [`llm`]: Model drivers and the analysis client
//! - [`pipeline`]: Per-document orchestration
//! - [`ui`]: HTML rendering

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod document;
pub mod llm;
pub mod pdf;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod telemetry;
pub mod ui;
pub mod upload;

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use crate::config::SystemStatus;
use crate::llm::{LlmSettings, Provider};
use crate::pipeline::DocumentAnalysisPipeline;
use crate::ui::HtmlRenderer;
use crate::upload::UploadLimits;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Document analysis pipeline.
    pub pipeline: Arc<DocumentAnalysisPipeline>,
    /// Form and result renderer.
    pub renderer: Arc<HtmlRenderer>,
    /// Credential status, fixed at startup.
    pub status: SystemStatus,
    /// Per-request upload limits.
    pub limits: UploadLimits,
    /// Documents currently being processed, across all requests.
    pub in_progress: Arc<AtomicUsize>,
    /// Configured model name.
    pub model: String,
    /// Detected provider.
    pub provider: Provider,
}

impl AppState {
    /// Assemble state around a pipeline.
    #[must_use]
    pub fn new(
        pipeline: DocumentAnalysisPipeline,
        limits: UploadLimits,
        settings: &LlmSettings,
    ) -> Self {
        let status = pipeline.client().status();
        Self {
            pipeline: Arc::new(pipeline),
            renderer: Arc::new(HtmlRenderer::new(limits.max_files, limits.max_file_size)),
            status,
            limits,
            in_progress: Arc::new(AtomicUsize::new(0)),
            model: settings.model.clone(),
            provider: settings.provider,
        }
    }
}
