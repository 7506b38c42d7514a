use std::sync::Arc;

use serde::Serialize;

use super::pipeline::{MatchResult, ReadinessPipeline};
use super::report::ReadinessReportView;
use crate::document::{DocumentError, DocumentFormat, TextExtractor, DEFAULT_MAX_DOCUMENT_BYTES};

/// Completed analysis of one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DocumentFormat>,
    pub characters: usize,
    pub result: MatchResult,
    pub report: ReadinessReportView,
}

/// Service composing document decoding with the shared readiness pipeline.
pub struct ReadinessService<E> {
    pipeline: Arc<ReadinessPipeline>,
    extractor: Arc<E>,
    upload_limit: usize,
}

impl<E> ReadinessService<E>
where
    E: TextExtractor + 'static,
{
    pub fn new(pipeline: Arc<ReadinessPipeline>, extractor: Arc<E>) -> Self {
        Self {
            pipeline,
            extractor,
            upload_limit: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }

    pub fn with_upload_limit(mut self, upload_limit: usize) -> Self {
        self.upload_limit = upload_limit;
        self
    }

    pub fn pipeline(&self) -> &ReadinessPipeline {
        &self.pipeline
    }

    pub fn upload_limit(&self) -> usize {
        self.upload_limit
    }

    /// Analyze text that has already been decoded.
    pub fn analyze_text(&self, text: &str) -> DocumentAnalysis {
        self.analyze(text, None)
    }

    /// Decode a raw upload and analyze it. Decode failures stop before the pipeline runs.
    pub fn analyze_document(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<DocumentAnalysis, DocumentError> {
        if bytes.len() > self.upload_limit {
            return Err(DocumentError::TooLarge {
                size: bytes.len(),
                limit: self.upload_limit,
            });
        }

        let text = self.extractor.extract(bytes, format)?;
        Ok(self.analyze(&text, Some(format)))
    }

    fn analyze(&self, text: &str, format: Option<DocumentFormat>) -> DocumentAnalysis {
        let result = self.pipeline.run(text);
        let report = ReadinessReportView::build(text, &result);

        DocumentAnalysis {
            format,
            characters: text.chars().count(),
            result,
            report,
        }
    }
}
