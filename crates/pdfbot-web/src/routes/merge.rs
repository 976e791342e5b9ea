//! Merge route - bundle a unit's topic PDFs into one document.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use pdfbot_core::{BundleRequest, RequestLog};
use std::sync::Arc;
use tracing::{info, warn};

use super::MergeRequest;
use crate::helpers::{MergeResponse, RouteResult};
use crate::state::AppState;

/// Fetch every topic PDF of a unit and return them merged, base64-encoded.
///
/// A body that is not a JSON object is answered like one with missing fields.
pub async fn merge_unit(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MergeRequest>, JsonRejection>,
) -> RouteResult<Json<MergeResponse>> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            MergeRequest::default()
        }
    };

    let request = BundleRequest::from_json_fields(body.access_token.as_ref(), body.unit_id.as_ref())
        .map_err(|e| MergeResponse::from_error(&e, RequestLog::new()))?;

    info!("Bundling unit {}", request.unit_id());

    let mut log = RequestLog::new();
    match state.bundler.bundle(&request, &mut log).await {
        Ok(Some(merged)) => {
            info!(
                "Unit {}: merged {} documents ({} bytes)",
                request.unit_id(),
                merged.document_count(),
                merged.bytes().len()
            );
            Ok(Json(MergeResponse::merged(merged.to_base64(), log)))
        }
        Ok(None) => Ok(Json(MergeResponse::nothing_to_merge(log))),
        Err(e) => Err(MergeResponse::from_error(&e, log)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use bytes::Bytes;
    use pdfbot_core::{ApiConfig, ApiInfo, Error, LearningApi, Result, Topic, UnitId};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// Platform double: fixed topics, every listed path serves `pdf`
    struct StubApi {
        topics: Option<Vec<Topic>>,
        pdf: Vec<u8>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LearningApi for StubApi {
        fn info(&self) -> ApiInfo {
            ApiInfo {
                name: "stub",
                base_url: "https://stub.test".to_string(),
            }
        }

        async fn list_topics(&self, _unit_id: &UnitId, _access_token: &str) -> Result<Vec<Topic>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.topics.clone().ok_or(Error::UpstreamApi { status: 404 })
        }

        async fn fetch_pdf(&self, url: &str, _access_token: &str) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.ends_with("missing.pdf") {
                return Err(Error::PdfFetchStatus {
                    url: url.to_string(),
                    status: 404,
                });
            }
            Ok(Bytes::from(self.pdf.clone()))
        }
    }

    fn one_page_pdf() -> Vec<u8> {
        use lopdf::{Dictionary, Document, Object};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            ),
        ]));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(vec![Object::Reference(page_id)])),
                ("Count", Object::Integer(1)),
            ])),
        );
        let catalog_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn stub(topics: Option<Vec<Topic>>) -> Arc<StubApi> {
        Arc::new(StubApi {
            topics,
            pdf: one_page_pdf(),
            calls: AtomicUsize::new(0),
        })
    }

    fn app(api: &Arc<StubApi>) -> axum::Router {
        let api: Arc<dyn LearningApi> = api.clone();
        let state = AppState::with_api(api, ApiConfig::default()).unwrap();
        crate::app(Arc::new(state), std::env::temp_dir())
    }

    async fn post(app: axum::Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn decoded_len(data: &str) -> usize {
        STANDARD.decode(data).map(|d| d.len()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_merged_response() {
        let api = stub(Some(vec![
            Topic::with_pdf("a.pdf"),
            Topic::default(),
            Topic::with_pdf("b.pdf"),
        ]));

        let (status, body) = post(app(&api), r#"{"accessToken":"tok","unitId":77}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "PDFs merged successfully");
        assert!(decoded_len(body["pdfData"].as_str().unwrap()) > 0);
        assert_eq!(body["logs"], json!(["Found 3 topics", "Merging PDFs..."]));
    }

    #[tokio::test]
    async fn test_nothing_to_merge_has_no_pdf_data() {
        let api = stub(Some(vec![Topic::default()]));

        let (status, body) = post(app(&api), r#"{"accessToken":"tok","unitId":"77"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "No PDFs found to merge");
        assert!(body.get("pdfData").is_none());
        assert_eq!(body["logs"], json!(["Found 1 topics"]));
    }

    #[tokio::test]
    async fn test_missing_parameters_make_no_calls() {
        let api = stub(Some(vec![Topic::with_pdf("a.pdf")]));

        for payload in [
            r#"{"unitId":"77"}"#,
            r#"{"accessToken":"tok"}"#,
            r#"{"accessToken":"","unitId":"77"}"#,
            r#"{"accessToken":"tok","unitId":0}"#,
            "not json",
        ] {
            let (status, body) = post(app(&api), payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
            assert_eq!(body["message"], "Missing required parameters");
            assert_eq!(body["logs"], json!([]));
        }

        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_topics_failure_is_server_error_with_log() {
        let api = stub(None);

        let (status, body) = post(app(&api), r#"{"accessToken":"tok","unitId":"77"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error processing request");
        assert_eq!(
            body["logs"],
            json!(["Error in fetching or processing the data: API request failed with status: 404"])
        );
    }

    #[tokio::test]
    async fn test_failed_document_is_reported_in_logs() {
        let api = stub(Some(vec![Topic::with_pdf("a.pdf"), Topic::with_pdf("missing.pdf")]));

        let (status, body) = post(app(&api), r#"{"accessToken":"tok","unitId":"77"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let logs = body["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 3);
        let skipped = logs[1].as_str().unwrap();
        assert!(skipped.starts_with(
            "Error processing PDF: Error fetching PDF: Failed to fetch PDF from URL:"
        ));
        assert!(body["pdfData"].is_string());
    }
}
