//! Server-rendered HTML for the upload form and the results page.
//!
//! # Structure
//!
//! - [`FormRenderer`]: the upload page
//! - [`ResultRenderer`]: per-document outcomes
//! - [`HtmlRenderer`]: the built-in implementation of both
//!
//! Every string that came from a user or from the model is escaped before
//! it reaches the page.

mod markdown;

use html_escape::encode_text;

use crate::config::SystemStatus;
use crate::document::{AnalysisResult, DocumentOutcome, NamedOutcome};

/// Renders the page that accepts a batch of uploads.
pub trait FormRenderer {
    /// Upload page, with the offline notice when no credential is set.
    fn render_form(&self, status: SystemStatus) -> String;
}

/// Renders the outcomes of a processed batch.
pub trait ResultRenderer {
    /// `rejected` lists uploads that were refused before processing.
    fn render_results(
        &self,
        status: SystemStatus,
        outcomes: &[NamedOutcome],
        rejected: &[String],
    ) -> String;

    /// Page shown when the request itself could not be read.
    fn render_error(&self, status: SystemStatus, message: &str) -> String;
}

/// HTML renderer with the upload limits shown in the form.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    max_files: usize,
    max_file_size: usize,
}

impl HtmlRenderer {
    #[must_use]
    pub fn new(max_files: usize, max_file_size: usize) -> Self {
        Self {
            max_files,
            max_file_size,
        }
    }

    fn upload_form(&self) -> String {
        let help = format!(
            "You can upload up to {} PDFs at once ({} MB each). Each will be analyzed separately.",
            self.max_files,
            self.max_file_size / (1024 * 1024)
        );
        format!(
            r#"
    <form class="upload" action="/analyze" method="post" enctype="multipart/form-data"
          onsubmit="document.getElementById('busy').hidden = false; this.querySelector('button').disabled = true;">
        <label for="files">Choose your PDF files</label>
        <input id="files" type="file" name="files" accept=".pdf,application/pdf" multiple required>
        <p class="help">{help}</p>
        <button type="submit">Analyze</button>
        <div id="busy" class="busy" hidden>Reading and analyzing your documents... This may take a moment.</div>
    </form>"#,
            help = encode_text(&help),
        )
    }
}

impl FormRenderer for HtmlRenderer {
    fn render_form(&self, status: SystemStatus) -> String {
        let mut content = String::from(INTRO);
        if !status.is_configured() {
            content.push_str(&alert(
                "info",
                "Please add your Google API Key to the secrets file to begin.",
            ));
        }
        content.push_str(&self.upload_form());
        html_shell("PDF Analyzer", status, &content)
    }
}

impl ResultRenderer for HtmlRenderer {
    fn render_results(
        &self,
        status: SystemStatus,
        outcomes: &[NamedOutcome],
        rejected: &[String],
    ) -> String {
        let mut content = String::new();

        for reason in rejected {
            content.push_str(&alert("warning", reason));
        }

        if outcomes.is_empty() && rejected.is_empty() {
            content.push_str(&alert("info", "No PDF files were uploaded."));
        }

        for item in outcomes {
            content.push_str(&render_outcome(item));
        }

        content.push_str("\n    <hr>\n    <h2>Analyze more documents</h2>");
        content.push_str(&self.upload_form());
        html_shell("Analysis Results", status, &content)
    }

    fn render_error(&self, status: SystemStatus, message: &str) -> String {
        let mut content = alert("error", message);
        content.push_str(&self.upload_form());
        html_shell("Upload Error", status, &content)
    }
}

const INTRO: &str = r#"
    <p class="intro">Upload one or more PDF files below. The application will extract the text and use a generative model to produce an executive summary and a detailed analysis.</p>"#;

/// Render one document's section.
fn render_outcome(item: &NamedOutcome) -> String {
    let name = encode_text(&item.file_name);
    let body = match &item.outcome {
        DocumentOutcome::Analyzed(AnalysisResult::Success(text)) => {
            format!(r#"<div class="analysis">{}</div>"#, markdown::render(text))
        }
        DocumentOutcome::Analyzed(AnalysisResult::Failure(reason)) => alert_html(
            "error",
            &format!(
                "Analysis of <code>{name}</code> failed. {}",
                encode_text(reason)
            ),
        ),
        DocumentOutcome::EmptyContent => alert_html(
            "warning",
            &format!(
                "Could not extract text from <code>{name}</code>. The file might be empty, image-based, or corrupted."
            ),
        ),
        DocumentOutcome::ExtractionFailed(reason) => alert_html(
            "error",
            &format!("Could not read <code>{name}</code>. {}", encode_text(reason)),
        ),
    };

    format!(
        r#"
    <hr>
    <section class="document" data-outcome="{label}">
        <h2>Analysis for: <code>{name}</code></h2>
        {body}
    </section>"#,
        label = item.outcome.label(),
    )
}

/// A styled message block; `message` is escaped.
fn alert(kind: &str, message: &str) -> String {
    alert_html(kind, &encode_text(message))
}

/// A styled message block around markup that is already escaped.
fn alert_html(kind: &str, html: &str) -> String {
    format!(r#"<div class="alert {kind}" role="alert">{html}</div>"#)
}

/// Generate the HTML shell for the application.
fn html_shell(title: &str, status: SystemStatus, content: &str) -> String {
    let banner = if status.is_configured() {
        String::new()
    } else {
        alert(
            "warning",
            "Google API Key not found. Please configure it in your secrets to use the AI features. Simulated analyses are shown instead.",
        )
    };
    let title = encode_text(title);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="PDF Document Analyzer">
    <title>{title} - PDF Analyzer</title>
    <style>{STYLES}</style>
</head>
<body>
    <main>
        <h1>&#128196; PDF Document Analyzer</h1>
        {banner}
        {content}
    </main>
</body>
</html>"#
    )
}

const STYLES: &str = r"
    body { margin: 0; background-color: #f0f2f6; font-family: system-ui, sans-serif; color: #1f2937; }
    main { max-width: 60rem; margin: 2rem auto; padding: 2rem; background: white; border-radius: 0.5rem; box-shadow: 0 4px 6px rgba(0,0,0,0.1); }
    h1, h2, h3 { color: #1e3a8a; }
    .upload { display: flex; flex-direction: column; gap: 0.75rem; }
    .help { color: #6b7280; font-size: 0.875rem; margin: 0; }
    button { align-self: flex-start; padding: 0.5rem 1.25rem; border: 0; border-radius: 0.375rem; background: #1e3a8a; color: white; cursor: pointer; }
    button:disabled { opacity: 0.5; cursor: progress; }
    .busy { color: #1e3a8a; font-style: italic; }
    .analysis { line-height: 1.5; }
    .analysis ul { padding-left: 1.5rem; }
    .alert { padding: 0.75rem 1rem; border-radius: 0.375rem; margin: 0.75rem 0; }
    .alert.info { background: #e0f2fe; color: #075985; }
    .alert.warning { background: #fef3c7; color: #92400e; }
    .alert.error { background: #fee2e2; color: #991b1b; }
";

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> HtmlRenderer {
        HtmlRenderer::new(10, 50 * 1024 * 1024)
    }

    fn named(name: &str, outcome: DocumentOutcome) -> NamedOutcome {
        NamedOutcome {
            file_name: name.to_string(),
            outcome,
        }
    }

    #[test]
    fn test_form_shows_offline_notices() {
        let html = renderer().render_form(SystemStatus::CredentialAbsent);
        assert!(html.contains("Google API Key not found"));
        assert!(html.contains("Please add your Google API Key"));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains("up to 10 PDFs"));
    }

    #[test]
    fn test_form_without_notices_when_configured() {
        let html = renderer().render_form(SystemStatus::CredentialConfigured);
        assert!(!html.contains("Google API Key not found"));
        assert!(!html.contains("Please add your Google API Key"));
    }

    #[test]
    fn test_results_render_each_outcome() {
        let outcomes = vec![
            named(
                "a.pdf",
                DocumentOutcome::Analyzed(AnalysisResult::Success("**Executive Summary:**".into())),
            ),
            named("b.pdf", DocumentOutcome::EmptyContent),
            named("c.pdf", DocumentOutcome::ExtractionFailed("bad xref".into())),
            named(
                "d.pdf",
                DocumentOutcome::Analyzed(AnalysisResult::Failure("timeout".into())),
            ),
        ];
        let html = renderer().render_results(SystemStatus::CredentialConfigured, &outcomes, &[]);

        assert!(html.contains("Analysis for: <code>a.pdf</code>"));
        assert!(html.contains("<strong>Executive Summary:</strong>"));
        assert!(html.contains("Could not extract text from <code>b.pdf</code>"));
        assert!(html.contains("Could not read <code>c.pdf</code>. bad xref"));
        assert!(html.contains("Analysis of <code>d.pdf</code> failed. timeout"));
        assert!(!html.contains('`'));

        let a = html.find("a.pdf").unwrap();
        let d = html.find("d.pdf").unwrap();
        assert!(a < d);
    }

    #[test]
    fn test_untrusted_text_is_escaped() {
        let outcomes = vec![named(
            "<script>alert(1)</script>.pdf",
            DocumentOutcome::Analyzed(AnalysisResult::Success("<b>bold</b>".into())),
        )];
        let html = renderer().render_results(SystemStatus::CredentialConfigured, &outcomes, &[]);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }

    #[test]
    fn test_rejections_and_empty_batch() {
        let html = renderer().render_results(
            SystemStatus::CredentialAbsent,
            &[],
            &["File 'notes.txt' is not a PDF".to_string()],
        );
        assert!(html.contains("File 'notes.txt' is not a PDF"));
        assert!(!html.contains("No PDF files were uploaded"));

        let html = renderer().render_results(SystemStatus::CredentialAbsent, &[], &[]);
        assert!(html.contains("No PDF files were uploaded"));
    }
}
