use std::panic;

use tracing::debug;

use super::{docx, DocumentError, DocumentFormat};

pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;
/// Ceiling on the inflated body of a compressed container such as `.docx`.
pub const DEFAULT_MAX_EXPANDED_BYTES: usize = 64 * 1024 * 1024;

/// Decodes raw document bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, DocumentError>;
}

/// Bundled extractor covering plain text, markdown, PDF and Word documents.
#[derive(Debug, Clone)]
pub struct StandardExtractor {
    max_bytes: usize,
    max_expanded_bytes: usize,
}

impl Default for StandardExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOCUMENT_BYTES)
    }
}

impl StandardExtractor {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            max_expanded_bytes: DEFAULT_MAX_EXPANDED_BYTES,
        }
    }

    pub fn with_max_expanded_bytes(mut self, max_expanded_bytes: usize) -> Self {
        self.max_expanded_bytes = max_expanded_bytes;
        self
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn max_expanded_bytes(&self) -> usize {
        self.max_expanded_bytes
    }
}

impl TextExtractor for StandardExtractor {
    fn extract(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, DocumentError> {
        if bytes.len() > self.max_bytes {
            return Err(DocumentError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let text = match format {
            DocumentFormat::PlainText | DocumentFormat::Markdown => {
                String::from_utf8_lossy(bytes).into_owned()
            }
            DocumentFormat::Pdf => extract_pdf(bytes)?,
            DocumentFormat::Docx => docx::extract_text(bytes, self.max_expanded_bytes)?,
        };

        debug!(format = format.label(), bytes = bytes.len(), chars = text.chars().count(), "document decoded");
        Ok(text)
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, DocumentError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let outcome = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => Err(DocumentError::Corrupt {
            format: DocumentFormat::Pdf,
            detail: err.to_string(),
        }),
        Err(_) => Err(DocumentError::Corrupt {
            format: DocumentFormat::Pdf,
            detail: "PDF parser aborted on malformed input".to_string(),
        }),
    }
}
