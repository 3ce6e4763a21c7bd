//! Google Cloud Vision OCR backend.

use std::time::Instant;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use koreksi_core::traits::TextExtractor;

use crate::error::OcrError;

const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const FEATURE_TYPE: &str = "DOCUMENT_TEXT_DETECTION";

/// Dense-text recognition through the Vision `images:annotate` endpoint.
pub struct VisionExtractor {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl VisionExtractor {
    pub fn new(api_key: &str, base_url: Option<String>) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| OcrError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }
}

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    full_text_annotation: Option<TextAnnotation>,
    #[serde(default)]
    error: Option<Status>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct VisionError {
    error: Status,
}

#[async_trait]
impl TextExtractor for VisionExtractor {
    fn name(&self) -> &str {
        "vision"
    }

    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    async fn extract_text(&self, image: &[u8]) -> anyhow::Result<String> {
        let start = Instant::now();

        let body = AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: base64::engine::general_purpose::STANDARD.encode(image),
                },
                features: vec![Feature { kind: FEATURE_TYPE }],
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/images:annotate", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OcrError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    OcrError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                .saturating_mul(1000);
            return Err(OcrError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<VisionError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(OcrError::AuthenticationFailed(message).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<VisionError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(OcrError::ApiError { status, message }.into());
        }

        let api_response: AnnotateResponse =
            response.json().await.map_err(|e| OcrError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let first = api_response.responses.into_iter().next().unwrap_or_default();
        if let Some(err) = first.error {
            return Err(OcrError::ImageRejected {
                code: err.code,
                message: err.message,
            }
            .into());
        }

        let text = first
            .full_text_annotation
            .map(|annotation| annotation.text)
            .unwrap_or_default();
        if text.is_empty() {
            tracing::warn!("vision returned no text for the image");
        }

        tracing::debug!(
            "vision extracted {} chars in {}ms",
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}
