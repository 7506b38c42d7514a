use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use super::common::*;
use crate::document::{DocumentError, DocumentFormat, StandardExtractor, TextExtractor};
use crate::workflows::readiness::{readiness_router, ReadinessService};
use crate::workflows::readiness::router::{document_handler, DocumentQuery};

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    serde_json::from_slice(&bytes).expect("body is json")
}

#[tokio::test]
async fn text_route_returns_analysis() {
    let router = readiness_router(service());

    let response = router
        .oneshot(
            Request::post("/api/v1/readiness/text")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"text":"AML Policy Drafting is complete."}"#,
                ))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["result"]["readiness_score"], 40.0);
    assert_eq!(body["report"]["readiness_label"], "40.0/100");
    assert!(body.get("format").is_none());
}

#[tokio::test]
async fn document_route_decodes_markdown_by_filename() {
    let router = readiness_router(service());

    let response = router
        .oneshot(
            Request::post("/api/v1/readiness/document?filename=plan.md")
                .body(Body::from("# Plan\n\nHosted on AWS in Ireland."))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["format"], "markdown");
    assert_eq!(body["result"]["gap_flags"][0], "Data Residency Issue");
}

#[tokio::test]
async fn unknown_format_is_unsupported_media_type() {
    let response = document_handler::<StandardExtractor>(
        State(service()),
        Query(DocumentQuery {
            filename: None,
            format: Some("spreadsheet".to_string()),
        }),
        HeaderMap::new(),
        axum::body::Bytes::from_static(b"a,b,c"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("spreadsheet"));
}

#[tokio::test]
async fn corrupt_pdf_is_unprocessable() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        "application/pdf".parse().expect("header value"),
    );

    let response = document_handler::<StandardExtractor>(
        State(service()),
        Query(DocumentQuery::default()),
        headers,
        axum::body::Bytes::from_static(b"definitely not a pdf"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let limited = Arc::new(
        ReadinessService::new(Arc::new(pipeline()), Arc::new(StandardExtractor::default()))
            .with_upload_limit(8),
    );

    let response = document_handler::<StandardExtractor>(
        State(limited),
        Query(DocumentQuery {
            filename: Some("notes.txt".to_string()),
            format: None,
        }),
        HeaderMap::new(),
        axum::body::Bytes::from_static(b"more than eight bytes"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

/// Records which thread decoded the upload.
#[derive(Default)]
struct ThreadRecordingExtractor {
    decoded_on: Mutex<Option<ThreadId>>,
}

impl TextExtractor for ThreadRecordingExtractor {
    fn extract(&self, bytes: &[u8], _format: DocumentFormat) -> Result<String, DocumentError> {
        *self.decoded_on.lock().expect("extractor mutex") = Some(thread::current().id());
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[tokio::test]
async fn document_decoding_runs_off_the_request_thread() {
    let extractor = Arc::new(ThreadRecordingExtractor::default());
    let service = Arc::new(ReadinessService::new(
        Arc::new(pipeline()),
        Arc::clone(&extractor),
    ));

    let response = document_handler::<ThreadRecordingExtractor>(
        State(service),
        Query(DocumentQuery {
            filename: Some("plan.txt".to_string()),
            format: None,
        }),
        HeaderMap::new(),
        axum::body::Bytes::from_static(b"QCB Engagement booked."),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["format"], "plain_text");
    assert_eq!(body["result"]["matched_topics"][0], "QCB Engagement");

    let decoded_on = extractor
        .decoded_on
        .lock()
        .expect("extractor mutex")
        .expect("extractor ran");
    assert_ne!(decoded_on, thread::current().id());
}

#[tokio::test]
async fn docx_upload_is_decoded_by_the_document_route() {
    use std::io::Write;

    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .expect("part starts");
        writer
            .write_all(
                br#"<w:document><w:body><w:p><w:r><w:t>AML Policy Drafting</w:t></w:r></w:p></w:body></w:document>"#,
            )
            .expect("part written");
        writer.finish().expect("archive finishes");
    }

    let response = readiness_router(service())
        .oneshot(
            Request::post("/api/v1/readiness/document?filename=plan.docx")
                .body(Body::from(buffer.into_inner()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["format"], "docx");
    assert_eq!(body["result"]["readiness_score"], 40.0);
}
