//! Decoding uploaded documents into plain text ahead of the readiness pipeline.

mod docx;
mod extractor;

pub use extractor::{
    StandardExtractor, TextExtractor, DEFAULT_MAX_DOCUMENT_BYTES, DEFAULT_MAX_EXPANDED_BYTES,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Declared format of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Markdown,
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PlainText => "plain text",
            Self::Markdown => "markdown",
            Self::Pdf => "PDF",
            Self::Docx => "Word document",
        }
    }

    /// Short tags accepted on the command line and in query strings.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" | "text" | "plain" | "plain_text" | "plain-text" => Some(Self::PlainText),
            "md" | "markdown" => Some(Self::Markdown),
            "pdf" => Some(Self::Pdf),
            "docx" | "word" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_mime(mime: &mime::Mime) -> Option<Self> {
        match (mime.type_(), mime.subtype()) {
            (mime::TEXT, mime::PLAIN) => Some(Self::PlainText),
            (mime::TEXT, subtype) if subtype.as_str().eq_ignore_ascii_case("markdown") => {
                Some(Self::Markdown)
            }
            (mime::APPLICATION, mime::PDF) => Some(Self::Pdf),
            _ if mime.essence_str().eq_ignore_ascii_case(DOCX_MIME) => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_tag)
    }

    /// Resolve a format from an explicit tag, then a content type, then a file name.
    ///
    /// An explicit tag that is not recognised is an error rather than a fallthrough;
    /// generic binary content types are skipped.
    pub fn resolve(
        tag: Option<&str>,
        content_type: Option<&str>,
        filename: Option<&str>,
    ) -> Result<Self, DocumentError> {
        if let Some(tag) = tag.filter(|tag| !tag.trim().is_empty()) {
            return Self::from_tag(tag).ok_or_else(|| DocumentError::UnsupportedFormat(tag.to_string()));
        }

        if let Some(parsed) = content_type.and_then(|raw| raw.parse::<mime::Mime>().ok()) {
            if parsed != mime::APPLICATION_OCTET_STREAM {
                if let Some(format) = Self::from_mime(&parsed) {
                    return Ok(format);
                }
            }
        }

        if let Some(format) = filename.and_then(Self::from_path) {
            return Ok(format);
        }

        let described = filename
            .or(content_type)
            .unwrap_or("undeclared format")
            .to_string();
        Err(DocumentError::UnsupportedFormat(described))
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-document failure raised before the pipeline runs.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
    #[error("unable to decode {format} document: {detail}")]
    Corrupt {
        format: DocumentFormat,
        detail: String,
    },
    #[error("document is {size} bytes, above the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}
