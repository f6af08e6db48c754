//! PDF Analyzer server.
//!
//! Entry point for the document upload and analysis application.

use std::sync::Arc;

use dotenvy::dotenv;
use mimalloc::MiMalloc;

use pdf_analyzer::config::AppConfig;
use pdf_analyzer::{server, telemetry};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before anything reads the environment
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    server::start_server(Arc::new(config)).await
}
