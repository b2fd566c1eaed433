//! OCR engines
//!
//! Defines the engine trait and the hosted vision implementation that turns
//! page images into document-text annotations.

use async_trait::async_trait;
use serde::Deserialize;

use super::annotation::ImageAnnotation;
use super::types::OcrError;

/// OCR engine trait
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs and status reporting.
    fn name(&self) -> &'static str;

    /// Produce the document-text annotation for one page image.
    async fn annotate_image(&self, image_data: &[u8]) -> Result<ImageAnnotation, OcrError>;
}

/// Google Cloud Vision document-text engine.
pub struct VisionOcrEngine {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl VisionOcrEngine {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResult {
    #[serde(default)]
    full_text_annotation: Option<ImageAnnotation>,
    #[serde(default)]
    error: Option<AnnotateStatus>,
}

/// Per-image error the engine reports inside an otherwise successful
/// response.
#[derive(Debug, Deserialize)]
struct AnnotateStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[async_trait]
impl OcrEngine for VisionOcrEngine {
    fn name(&self) -> &'static str {
        "vision"
    }

    async fn annotate_image(&self, image_data: &[u8]) -> Result<ImageAnnotation, OcrError> {
        use base64::Engine;

        if self.api_key.is_empty() {
            return Err(OcrError::NotConfigured);
        }

        let url = format!("{}/v1/images:annotate?key={}", self.base_url, self.api_key);
        let content = base64::engine::general_purpose::STANDARD.encode(image_data);
        let request = serde_json::json!({
            "requests": [{
                "image": {"content": content},
                "features": [{"type": "DOCUMENT_TEXT_DETECTION"}],
            }]
        });

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let decoded: AnnotateResponse = response.json().await?;
        let result = decoded.responses.into_iter().next().unwrap_or_default();
        if let Some(error) = result.error {
            return Err(OcrError::Api {
                status: status.as_u16(),
                body: format!("annotation error {}: {}", error.code, error.message),
            });
        }

        // A page with no recognizable text comes back without an annotation.
        Ok(result.full_text_annotation.unwrap_or_default())
    }
}

#[cfg(test)]
pub struct MockEngine {
    pub annotation: ImageAnnotation,
}

#[cfg(test)]
#[async_trait]
impl OcrEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn annotate_image(&self, _image_data: &[u8]) -> Result<ImageAnnotation, OcrError> {
        Ok(self.annotation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Recorded {
        requests: Arc<AtomicUsize>,
    }

    async fn spawn_annotate_server(recorded: Recorded, body: serde_json::Value) -> SocketAddr {
        // The real annotate path contains a colon, which the router would
        // read as parameter syntax, so the test server matches a wildcard.
        let app = Router::new()
            .route(
                "/v1/*endpoint",
                post(
                    move |State(recorded): State<Recorded>, Json(_request): Json<serde_json::Value>| {
                        let body = body.clone();
                        async move {
                            recorded.requests.fetch_add(1, Ordering::SeqCst);
                            Json(body)
                        }
                    },
                ),
            )
            .with_state(recorded);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn decodes_full_text_annotation() {
        let recorded = Recorded::default();
        let body = serde_json::json!({
            "responses": [{
                "fullTextAnnotation": {
                    "text": "猫",
                    "pages": [{"blocks": [{"paragraphs": []}]}],
                }
            }]
        });
        let addr = spawn_annotate_server(recorded.clone(), body).await;

        let engine = VisionOcrEngine::new(&format!("http://{addr}"), "test-key");
        let annotation = engine.annotate_image(b"fake image bytes").await.unwrap();
        assert_eq!(annotation.text, "猫");
        assert_eq!(recorded.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_response_yields_empty_annotation() {
        let addr = spawn_annotate_server(Recorded::default(), serde_json::json!({"responses": [{}]})).await;

        let engine = VisionOcrEngine::new(&format!("http://{addr}"), "test-key");
        let annotation = engine.annotate_image(b"blank page").await.unwrap();
        assert!(annotation.is_empty());
    }

    #[tokio::test]
    async fn per_image_error_surfaces_as_api_failure() {
        let body = serde_json::json!({
            "responses": [{"error": {"code": 3, "message": "Bad image data."}}]
        });
        let addr = spawn_annotate_server(Recorded::default(), body).await;

        let engine = VisionOcrEngine::new(&format!("http://{addr}"), "test-key");
        let err = engine.annotate_image(b"garbage").await.unwrap_err();
        match err {
            OcrError::Api { body, .. } => assert!(body.contains("Bad image data")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let engine = VisionOcrEngine::new("http://127.0.0.1:9", "");
        let err = engine.annotate_image(b"image").await.unwrap_err();
        assert!(matches!(err, OcrError::NotConfigured));
    }
}
