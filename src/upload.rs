//! Multipart upload handling.
//!
//! Reads a batch of files from a multipart body, keeping PDFs and reporting
//! everything else as a per-file rejection rather than failing the request.

use axum::extract::Multipart;

use crate::document::UploadedDocument;

/// Upload limits applied per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum number of files per request.
    pub max_files: usize,
    /// Maximum file size in bytes.
    pub max_file_size: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_size: 50 * 1024 * 1024,
        }
    }
}

impl UploadLimits {
    /// Upper bound for a whole request body, with room for multipart framing.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        self.max_files
            .saturating_mul(self.max_file_size)
            .saturating_add(1024 * 1024)
    }
}

/// Files accepted for analysis plus the reasons others were refused.
#[derive(Debug, Default)]
pub struct UploadBatch {
    /// Accepted documents in upload order.
    pub documents: Vec<UploadedDocument>,
    /// One message per refused file.
    pub rejected: Vec<String>,
}

/// Errors that make the whole request unreadable.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Failed to read multipart field: {0}")]
    Multipart(String),

    #[error("Failed to read file '{filename}': {reason}")]
    Read { filename: String, reason: String },
}

impl UploadError {
    /// Stable code for the JSON API.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Multipart(_) => "MULTIPART_ERROR",
            Self::Read { .. } => "READ_ERROR",
        }
    }
}

/// Whether a file looks like a PDF by name or declared type.
#[must_use]
pub fn is_pdf(filename: &str, content_type: Option<&str>) -> bool {
    if content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf")) {
        return true;
    }
    mime_guess::from_path(filename)
        .first()
        .is_some_and(|m| m.essence_str() == "application/pdf")
}

/// Drain `multipart` into an [`UploadBatch`].
pub async fn read_uploads(
    multipart: &mut Multipart,
    limits: &UploadLimits,
) -> Result<UploadBatch, UploadError> {
    let mut batch = UploadBatch::default();
    let mut field_index: usize = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        field_index += 1;

        let declared_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);

        // Plain form fields carry neither a file name nor a content type.
        if declared_name.is_none() && content_type.is_none() {
            continue;
        }

        let unnamed = declared_name
            .as_deref()
            .is_none_or(|n| n.trim().is_empty());
        let filename = declared_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("document-{field_index}.pdf"));

        let data = field.bytes().await.map_err(|e| UploadError::Read {
            filename: filename.clone(),
            reason: e.to_string(),
        })?;

        // An empty file input is submitted as a nameless, empty part.
        if data.is_empty() && unnamed {
            continue;
        }

        if batch.documents.len() >= limits.max_files {
            batch.rejected.push(format!(
                "Maximum file count ({}) exceeded; '{}' and any later files were skipped",
                limits.max_files, filename
            ));
            break;
        }

        if !is_pdf(&filename, content_type.as_deref()) {
            batch.rejected.push(format!(
                "File '{}' is not a PDF ({})",
                filename,
                content_type.as_deref().unwrap_or("unknown type")
            ));
            continue;
        }

        if data.len() > limits.max_file_size {
            batch.rejected.push(format!(
                "File '{}' exceeds max size ({}MB > {}MB)",
                filename,
                data.len() / (1024 * 1024),
                limits.max_file_size / (1024 * 1024)
            ));
            continue;
        }

        tracing::debug!(file = %filename, size = data.len(), "Accepted upload");
        batch
            .documents
            .push(UploadedDocument::new(filename, data.to_vec()));
    }

    Ok(batch)
}
