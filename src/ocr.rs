//! The OCR boundary.
//!
//! The OCR service is a black box: image bytes in, a [`TextAnnotation`] out.
//! The one real implementation talks to the Google Cloud Vision
//! `images:annotate` endpoint. Handlers receive the engine as an injected
//! `Arc<dyn OcrEngine>`, so tests can substitute a canned one.

use std::env;

use async_trait::async_trait;
use base64::{Engine as _, prelude::BASE64_STANDARD};

use crate::{annotation::TextAnnotation, error::ScanError, prelude::*};

/// The production Vision API endpoint.
const DEFAULT_API_BASE: &str = "https://vision.googleapis.com";

/// Interface to an OCR engine.
#[async_trait]
pub trait OcrEngine: Send + Sync + 'static {
    /// Run document text detection on a single image.
    async fn detect_document_text(
        &self,
        image: &[u8],
    ) -> Result<TextAnnotation, ScanError>;
}

/// OCR engine wrapping the Google Cloud Vision REST API.
pub struct VisionOcrEngine {
    /// Shared HTTP client.
    client: reqwest::Client,

    /// The `images:annotate` URL.
    url: String,

    /// Our Vision API key, passed as a query parameter.
    api_key: String,
}

impl VisionOcrEngine {
    /// Create a new Vision engine from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GOOGLE_VISION_API_KEY")
            .context("GOOGLE_VISION_API_KEY environment variable is not set")?;
        let api_base = env::var("GOOGLE_VISION_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_owned());
        Ok(Self::new(&api_base, api_key))
    }

    /// Create a new Vision engine against a specific API base URL.
    pub fn new(api_base: &str, api_key: String) -> Self {
        let url = format!("{}/v1/images:annotate", api_base.trim_end_matches('/'));
        Self {
            client: reqwest::Client::new(),
            url,
            api_key,
        }
    }
}

#[async_trait]
impl OcrEngine for VisionOcrEngine {
    #[instrument(level = "debug", skip_all, fields(image_bytes = image.len()))]
    async fn detect_document_text(
        &self,
        image: &[u8],
    ) -> Result<TextAnnotation, ScanError> {
        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: BASE64_STANDARD.encode(image),
                },
                features: vec![Feature {
                    kind: "DOCUMENT_TEXT_DETECTION",
                }],
                image_context: ImageContext {
                    language_hints: vec!["en"],
                },
            }],
        };

        // One request per upload. No retries: a failed scan surfaces as an
        // error page and the user can resubmit.
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                ScanError::OcrServiceFailure(format!("request failed: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            // Vision errors carry a JSON body with a message. Include it if
            // we can get it.
            let detail = match response.json::<ErrorEnvelope>().await {
                Ok(body) => body.error.message,
                Err(_) => "no error detail".to_owned(),
            };
            return Err(ScanError::OcrServiceFailure(format!(
                "Vision API returned status {status}: {detail}"
            )));
        }

        let envelope = response.json::<AnnotateResponse>().await.map_err(|err| {
            ScanError::OcrServiceFailure(format!("failed to parse response: {err}"))
        })?;
        let image_response =
            envelope.responses.into_iter().next().ok_or_else(|| {
                ScanError::OcrServiceFailure("response contained no results".to_owned())
            })?;
        annotation_from_response(image_response)
    }
}

/// Extract the text annotation from a per-image response.
fn annotation_from_response(
    response: AnnotateImageResponse,
) -> Result<TextAnnotation, ScanError> {
    if let Some(error) = response.error {
        return Err(ScanError::OcrServiceFailure(format!(
            "Vision API error {}: {}",
            error.code, error.message
        )));
    }
    let annotation = response.full_text_annotation.ok_or_else(|| {
        ScanError::InvalidAnnotation("response contained no text annotation".to_owned())
    })?;
    serde_json::from_value::<TextAnnotation>(annotation)
        .map_err(|err| ScanError::InvalidAnnotation(err.to_string()))
}

/// An `images:annotate` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

/// A request to annotate a single image.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
    image_context: ImageContext,
}

/// Base64-encoded image bytes.
#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

/// An annotation feature to run.
#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Hints about the image.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageContext {
    language_hints: Vec<&'static str>,
}

/// An `images:annotate` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    responses: Vec<AnnotateImageResponse>,
}

/// The response for a single image.
///
/// We keep the annotation as a raw JSON value here so that a structurally
/// malformed annotation reports `InvalidAnnotation`, not a generic parse
/// failure of the whole envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    full_text_annotation: Option<serde_json::Value>,

    #[serde(default)]
    error: Option<VisionStatus>,
}

/// A Vision API error status.
#[derive(Debug, Deserialize)]
struct VisionStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// A top-level Vision error body, returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: VisionStatus,
}

/// A canned OCR engine for tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Returns a fixed annotation and counts how often it was called.
    pub struct FixedOcrEngine {
        annotation: TextAnnotation,
        calls: AtomicUsize,
    }

    impl FixedOcrEngine {
        pub fn new(annotation: TextAnnotation) -> Self {
            Self {
                annotation,
                calls: AtomicUsize::new(0),
            }
        }

        /// How many times has the engine been invoked?
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OcrEngine for FixedOcrEngine {
        async fn detect_document_text(
            &self,
            _image: &[u8],
        ) -> Result<TextAnnotation, ScanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.annotation.clone())
        }
    }
}
