use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use super::service::ReadinessService;
use crate::document::{DocumentError, DocumentFormat, TextExtractor};
use crate::error::document_status;

/// Already-decoded document text submitted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSubmission {
    pub text: String,
}

/// Format hints accompanying a raw document upload.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

/// Router exposing text and raw-document analysis endpoints.
pub fn readiness_router<E>(service: Arc<ReadinessService<E>>) -> Router
where
    E: TextExtractor + 'static,
{
    let body_limit = service.upload_limit();

    Router::new()
        .route("/api/v1/readiness/text", post(text_handler::<E>))
        .route("/api/v1/readiness/document", post(document_handler::<E>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

pub(crate) async fn text_handler<E>(
    State(service): State<Arc<ReadinessService<E>>>,
    axum::Json(submission): axum::Json<TextSubmission>,
) -> Response
where
    E: TextExtractor + 'static,
{
    let analysis = service.analyze_text(&submission.text);
    (StatusCode::OK, axum::Json(analysis)).into_response()
}

pub(crate) async fn document_handler<E>(
    State(service): State<Arc<ReadinessService<E>>>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    E: TextExtractor + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let format = match DocumentFormat::resolve(
        query.format.as_deref(),
        content_type,
        query.filename.as_deref(),
    ) {
        Ok(format) => format,
        Err(error) => return document_error(error),
    };

    // PDF and docx decoding are CPU-bound; keep them off the async workers.
    let worker = Arc::clone(&service);
    let outcome =
        tokio::task::spawn_blocking(move || worker.analyze_document(&body, format)).await;

    match outcome {
        Ok(Ok(analysis)) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Ok(Err(error)) => document_error(error),
        Err(join_error) => {
            error!(error = %join_error, "document analysis task failed");
            let payload = json!({
                "error": "document analysis failed",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn document_error(error: DocumentError) -> Response {
    warn!(%error, "document rejected before analysis");
    let payload = json!({
        "error": error.to_string(),
    });
    (document_status(&error), axum::Json(payload)).into_response()
}
