//! PDF text extraction.
//!
//! The pipeline only depends on the [`PdfTextExtractor`] trait; the bundled
//! [`LopdfExtractor`] implements it on top of the `lopdf` crate.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdf_analyzer::pdf::{LopdfExtractor, PdfTextExtractor};
//!
//! let text = LopdfExtractor::new().extract(&bytes)?;
//! println!("Extracted: {text}");
//! ```

mod lopdf_backend;

pub use lopdf_backend::LopdfExtractor;

/// Errors raised when a byte sequence cannot be read as a PDF at all.
///
/// Pages that merely contain no text are not errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// No bytes were supplied.
    #[error("Document is empty")]
    Empty,

    /// The document structure could not be parsed.
    #[error("Error reading PDF file: {0}")]
    Malformed(String),

    /// The document is encrypted and cannot be opened without a password.
    #[error("PDF file is encrypted and cannot be read: {0}")]
    Encrypted(String),
}

/// Trait for PDF text extractors.
///
/// Implementations must be pure: the same bytes always produce the same
/// result and nothing outside the call is touched.
pub trait PdfTextExtractor: Send + Sync + std::fmt::Debug {
    /// Extract the text of every page, in page order, concatenated.
    ///
    /// The returned string may be empty.
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;

    /// Get the extractor name for logging and debugging.
    fn name(&self) -> &'static str;
}
