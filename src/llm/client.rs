//! Chat-completion client shared by the Deepseek and OpenAI providers.
//!
//! Both expose an OpenAI-compatible `/chat/completions` endpoint, so one client
//! is parameterised by [`LlmProviderKind`]. Error bodies are normalised into
//! [`ProviderError`], with quota and rate-limit conditions split out.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::LanguageModel;
use crate::error::ProviderError;
use crate::vision::strip_data_url;

const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.2;

/// The chat-completion providers this service knows about, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProviderKind {
    Deepseek,
    OpenAi,
}

impl LlmProviderKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Deepseek => "deepseek",
            Self::OpenAi => "openai",
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            Self::Deepseek => "https://api.deepseek.com/chat/completions",
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Deepseek => "deepseek-chat",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    /// Deepseek's chat endpoint is text-only.
    pub fn supports_images(self) -> bool {
        matches!(self, Self::OpenAi)
    }
}

/// Chat-completion client for one provider.
#[derive(Clone)]
pub struct ChatCompletionClient {
    client: Client,
    kind: LlmProviderKind,
    api_key: String,
    url: String,
    model: String,
}

impl ChatCompletionClient {
    pub fn new(client: Client, kind: LlmProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            client,
            kind,
            api_key: api_key.into(),
            url: kind.default_url().to_string(),
            model: kind.default_model().to_string(),
        }
    }

    /// Create a client with a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different endpoint (proxies, tests).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    async fn send_request(&self, request: ChatCompletionRequest) -> Result<String, ProviderError> {
        let label = self.kind.label();
        debug!("Sending request to {}: model={}", label, request.model);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::transport(label, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error(label, status.as_u16(), &error_text));
        }

        let response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(label, format!("Failed to parse response: {}", e)))?;

        if let Some(usage) = &response.usage {
            info!(
                "{} response: {} tokens (prompt: {}, completion: {})",
                label, usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderError::malformed(label, "Empty completion"))
    }
}

#[async_trait::async_trait]
impl LanguageModel for ChatCompletionClient {
    fn label(&self) -> &str {
        self.kind.label()
    }

    fn supports_images(&self) -> bool {
        self.kind.supports_images()
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(MAX_TOKENS),
            temperature: Some(TEMPERATURE),
        };
        self.send_request(request).await
    }
}

// ============================================================================
// Error normalisation
// ============================================================================

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Map a non-2xx body to a quota error or a plain HTTP error.
pub fn classify_error(provider: &str, status: u16, body: &str) -> ProviderError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);

    let message = parsed
        .as_ref()
        .and_then(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    let is_quota = parsed.as_ref().is_some_and(|e| {
        e.error_type.as_deref() == Some("insufficient_quota")
            || e.code.as_ref().and_then(|c| c.as_str()) == Some("rate_limit_exceeded")
    }) || message.to_lowercase().contains("quota");

    if is_quota {
        ProviderError::QuotaExceeded {
            provider: provider.to_string(),
            message,
        }
    } else {
        ProviderError::Http {
            provider: provider.to_string(),
            status,
            message,
        }
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// ============================================================================
// Message types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message with text and one base64 image (plain or data URL).
    pub fn user_with_image(text: impl Into<String>, image_base64: &str) -> Self {
        let data = strip_data_url(image_base64);
        let data_url = format!("data:{};base64,{}", detect_image_mime(data), data);

        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ]),
        }
    }

    #[cfg(test)]
    pub fn has_image(&self) -> bool {
        matches!(&self.content, MessageContent::Parts(parts)
            if parts.iter().any(|p| matches!(p, ContentPart::ImageUrl { .. })))
    }
}

/// Sniff the image type from the first decoded bytes; JPEG when unknown.
pub fn detect_image_mime(image_base64: &str) -> &'static str {
    let head: String = image_base64.chars().take(16).collect();
    let bytes = BASE64.decode(head.as_bytes()).unwrap_or_default();

    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
