//! Image-labelling provider abstraction.
//!
//! Defines the [`VisionProvider`] trait and the Google Cloud Vision backend. One
//! request per image asks for labels, text and objects together; retries and
//! fallback belong to the orchestrator.

use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::schema::{VisionData, VisionLabel, VisionObject};

pub const DEFAULT_GOOGLE_VISION_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

const MAX_LABELS: u32 = 15;
const MAX_TEXT: u32 = 10;
const MAX_OBJECTS: u32 = 15;

/// Async trait implemented by each image-labelling backend.
#[async_trait::async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn analyze(&self, image_base64: &str) -> Result<VisionData, ProviderError>;
}

/// Strip a `data:image/...;base64,` prefix if the client sent a data URL.
pub fn strip_data_url(image: &str) -> &str {
    match image.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image,
    }
}

pub struct GoogleVisionProvider {
    api_key: String,
    url: String,
    client: reqwest::Client,
}

impl GoogleVisionProvider {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            url: url.into(),
            client,
        }
    }
}

// ── Google Vision API response types ────────────────────────────────────────

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<VisionLabel>,
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<VisionObject>,
    #[serde(default)]
    error: Option<ApiStatus>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize, Default)]
struct ApiStatus {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// gRPC code Google uses for exhausted quota.
const RESOURCE_EXHAUSTED_CODE: i64 = 8;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiStatus,
}

// ── Provider implementation ─────────────────────────────────────────────────

#[async_trait::async_trait]
impl VisionProvider for GoogleVisionProvider {
    fn name(&self) -> &str {
        "google-vision"
    }

    async fn analyze(&self, image_base64: &str) -> Result<VisionData, ProviderError> {
        let body = json!({
            "requests": [{
                "image": { "content": strip_data_url(image_base64) },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": MAX_LABELS },
                    { "type": "TEXT_DETECTION", "maxResults": MAX_TEXT },
                    { "type": "OBJECT_LOCALIZATION", "maxResults": MAX_OBJECTS },
                ]
            }]
        });

        info!("GoogleVisionProvider: calling images:annotate");

        let resp = self
            .client
            .post(&self.url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(self.name(), e))?;

        let status = resp.status();
        let raw_text = resp
            .text()
            .await
            .map_err(|e| ProviderError::transport(self.name(), e))?;

        if !status.is_success() {
            let api_status = match serde_json::from_str::<ErrorEnvelope>(&raw_text) {
                Ok(envelope) => envelope.error,
                Err(_) => ApiStatus {
                    message: raw_text,
                    ..Default::default()
                },
            };
            return Err(classify_vision_error(self.name(), status.as_u16(), api_status));
        }

        debug!(
            "GoogleVisionProvider: raw response ({} bytes): {}",
            raw_text.len(),
            raw_text.chars().take(500).collect::<String>()
        );

        let parsed: AnnotateResponse = serde_json::from_str(&raw_text)
            .map_err(|e| ProviderError::malformed(self.name(), format!("Invalid response: {}", e)))?;

        let first = parsed
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::malformed(self.name(), "Empty response from Google Vision"))?;

        if let Some(err) = first.error {
            let err = ApiStatus {
                message: format!("{} (code {})", err.message, err.code),
                ..err
            };
            return Err(classify_vision_error(self.name(), status.as_u16(), err));
        }

        let data = normalize(first);
        info!(
            "GoogleVisionProvider: {} food items, {} chars of text",
            data.food_items.len(),
            data.detected_text.len()
        );
        Ok(data)
    }
}

/// Quota failures are HTTP 429, `RESOURCE_EXHAUSTED`, gRPC code 8, or a
/// message that mentions quota.
fn classify_vision_error(provider: &str, status: u16, err: ApiStatus) -> ProviderError {
    let is_quota = status == 429
        || err.status == "RESOURCE_EXHAUSTED"
        || err.code == RESOURCE_EXHAUSTED_CODE
        || err.message.to_lowercase().contains("quota");

    if is_quota {
        ProviderError::QuotaExceeded {
            provider: provider.to_string(),
            message: err.message,
        }
    } else {
        ProviderError::Http {
            provider: provider.to_string(),
            status,
            message: err.message,
        }
    }
}

/// Flatten labels and objects into one list, keeping first occurrence order.
fn normalize(resp: AnnotateImageResponse) -> VisionData {
    let mut seen = HashSet::new();
    let food_items = resp
        .label_annotations
        .iter()
        .map(|l| l.description.as_str())
        .chain(resp.localized_object_annotations.iter().map(|o| o.name.as_str()))
        .filter(|name| !name.trim().is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(String::from)
        .collect();

    let detected_text = resp
        .text_annotations
        .into_iter()
        .next()
        .map(|t| t.description)
        .unwrap_or_default();

    VisionData {
        food_items,
        detected_text,
        raw_labels: resp.label_annotations,
        raw_objects: resp.localized_object_annotations,
    }
}
