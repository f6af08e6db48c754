//! `lopdf`-backed text extraction.

use lopdf::Document;

use super::{ExtractionError, PdfTextExtractor};

/// Extractor that parses the document with `lopdf` and pulls text page by
/// page.
///
/// A page whose content cannot be decoded contributes an empty string, the
/// same as a page with no text operators. Pages are joined without a
/// separator.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }
}

impl PdfTextExtractor for LopdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::Empty);
        }

        let mut doc =
            Document::load_mem(bytes).map_err(|e| ExtractionError::Malformed(e.to_string()))?;

        // Only the empty user password is tried; anything else is unreadable.
        if doc.is_encrypted() {
            doc.decrypt("").map_err(|e| ExtractionError::Encrypted(e.to_string()))?;
        }

        // `get_pages` is keyed by page number, so iteration is in page order.
        let pages = doc.get_pages();
        let mut text = String::new();
        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(page_text) => text.push_str(&page_text),
                Err(e) => {
                    tracing::debug!(
                        page = page_number,
                        error = %e,
                        "Page yielded no extractable text"
                    );
                }
            }
        }

        tracing::debug!(
            page_count = pages.len(),
            text_length = text.len(),
            "Extracted PDF text"
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "lopdf"
    }
}
