//! Prompt construction for document analysis.

/// Instructions placed ahead of the document text.
const INSTRUCTIONS: &str = "\
Based on the following text extracted from a PDF document, please provide a comprehensive analysis. Structure your response into two distinct sections:

1.  **Executive Summary:** A concise, high-level overview of the document's key points, purpose, and conclusions. This should be easy to understand for someone who has not read the document.

2.  **In-depth Analysis:** A detailed breakdown of the document. This should include:
    * Identification of the main arguments or topics.
    * An evaluation of the evidence or data presented.
    * A discussion of the document's implications, strengths, and potential weaknesses.
    * Any other critical insights you can derive from the text.

Here is the document text:";

/// Delimiter placed on its own line around the document text.
const DELIMITER: &str = "---";

/// Builds the analysis prompt from extracted text.
///
/// The output depends only on the input text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Create a new prompt builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Substitute `text` into the fixed template.
    #[must_use]
    pub fn build(&self, text: &str) -> String {
        let mut prompt =
            String::with_capacity(INSTRUCTIONS.len() + text.len() + 2 * DELIMITER.len() + 4);
        prompt.push_str(INSTRUCTIONS);
        prompt.push('\n');
        prompt.push_str(DELIMITER);
        prompt.push('\n');
        prompt.push_str(text);
        prompt.push('\n');
        prompt.push_str(DELIMITER);
        prompt
    }
}
