use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::config::{AppConfig, CredentialSource, SystemStatus, resolve_credential};
use crate::document::{NamedOutcome, UploadedDocument};
use crate::llm::AnalysisClient;
use crate::pdf::LopdfExtractor;
use crate::pipeline::DocumentAnalysisPipeline;
use crate::ui::{FormRenderer, ResultRenderer};
use crate::upload::{UploadLimits, read_uploads};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let credential = resolve_credential(Path::new(&config.secrets.path));
    match &credential {
        Some((_, source)) => {
            let source = match source {
                CredentialSource::SecretsFile => "secrets_file",
                CredentialSource::Environment => "environment",
            };
            info!(name: "config.credential", source, "API key configured");
        }
        None => {
            tracing::warn!(
                name: "credential.absent",
                secrets_path = %config.secrets.path,
                "API key not found; serving simulated analyses"
            );
        }
    }

    let settings = config.llm_settings(credential.map(|(key, _)| key));
    info!(
        name: "config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        provider = %settings.provider,
        "LLM configuration loaded"
    );

    let client = AnalysisClient::from_settings(&settings)?;
    let pipeline = DocumentAnalysisPipeline::new(Arc::new(LopdfExtractor::new()), client);
    let limits = UploadLimits {
        max_files: config.upload.max_files,
        max_file_size: config.upload.max_file_size,
    };
    let state = AppState::new(pipeline, limits, &settings);

    let app = build_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
///
/// `request_timeout` applies to the page and status routes only. The batch
/// routes run every accepted document to completion; each model call is
/// bounded by the driver's own HTTP timeout instead.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let body_limit = state.limits.body_limit();

    Router::new()
        .route("/", get(index_handler))
        .route("/api/status", get(api_status_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(request_timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .route("/analyze", post(analyze_form_handler))
        .route("/api/analyze", post(api_analyze_handler))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Busy tracking
// ─────────────────────────────────────────────────────────────────────────────

/// Marks one document as in progress for as long as it lives.
///
/// Dropped on every exit path, including when a disconnecting client
/// cancels the request future.
#[derive(Debug)]
pub struct BusyGuard {
    counter: Arc<AtomicUsize>,
}

impl BusyGuard {
    pub fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Process a batch in order, one document at a time.
async fn run_batch(state: &AppState, docs: Vec<UploadedDocument>) -> Vec<NamedOutcome> {
    let batch_id = uuid::Uuid::new_v4().to_string();
    info!(batch_id = %batch_id, documents = docs.len(), "Starting batch");

    let mut outcomes = Vec::with_capacity(docs.len());
    for doc in docs {
        let _busy = BusyGuard::enter(&state.in_progress);
        let file_name = doc.name.clone();

        info!(
            name: "document.received",
            batch_id = %batch_id,
            file = %file_name,
            size = doc.size(),
            "Processing document"
        );

        let outcome = state.pipeline.process(doc).await;
        outcomes.push(NamedOutcome { file_name, outcome });
    }

    info!(batch_id = %batch_id, "Batch complete");
    outcomes
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Upload form.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(state.renderer.render_form(state.status))
}

/// POST /analyze - Analyze uploaded files and render the results page.
async fn analyze_form_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let batch = match read_uploads(&mut multipart, &state.limits).await {
        Ok(batch) => batch,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected upload request");
            return (
                StatusCode::BAD_REQUEST,
                Html(state.renderer.render_error(state.status, &e.to_string())),
            )
                .into_response();
        }
    };

    let outcomes = run_batch(&state, batch.documents).await;
    Html(
        state
            .renderer
            .render_results(state.status, &outcomes, &batch.rejected),
    )
    .into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Response from the analyze API.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// One entry per accepted document, in upload order.
    pub outcomes: Vec<NamedOutcome>,
    /// Reasons files were refused.
    pub rejected: Vec<String>,
}

/// Error body for API failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

/// Response from the status API.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub credential: SystemStatus,
    pub model: String,
    pub provider: String,
    pub documents_in_progress: usize,
}

/// POST /api/analyze - Analyze uploaded files and return outcomes as JSON.
async fn api_analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<ApiError>)> {
    let batch = read_uploads(&mut multipart, &state.limits)
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    error: e.to_string(),
                    code: e.code().to_string(),
                }),
            )
        })?;

    let outcomes = run_batch(&state, batch.documents).await;
    Ok(Json(AnalyzeResponse {
        outcomes,
        rejected: batch.rejected,
    }))
}

/// GET /api/status - Credential and model status.
async fn api_status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        credential: state.status,
        model: state.model.clone(),
        provider: state.provider.to_string(),
        documents_in_progress: state.in_progress.load(Ordering::SeqCst),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_guard_releases_on_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let _a = BusyGuard::enter(&counter);
            let _b = BusyGuard::enter(&counter);
            assert_eq!(counter.load(Ordering::SeqCst), 2);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_busy_guard_releases_on_panic() {
        let counter = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&counter);
        let result = std::panic::catch_unwind(move || {
            let _guard = BusyGuard::enter(&inner);
            panic!("processing blew up");
        });
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
