//! Error taxonomy for provider calls and the extraction endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// A failure from one external provider. Never surfaced to the caller directly;
/// the orchestrator logs it and moves on to the next option.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Request could not be sent or the response body could not be read.
    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    /// Non-2xx status that is not a quota condition.
    #[error("{provider} API error ({status}): {message}")]
    Http {
        provider: String,
        status: u16,
        message: String,
    },

    /// Provider-reported rate limit or exhausted quota.
    #[error("{provider} quota exceeded: {message}")]
    QuotaExceeded { provider: String, message: String },

    /// Provider replied but the content is not a usable ingredient list.
    #[error("{provider}: {message}")]
    MalformedResponse { provider: String, message: String },
}

impl ProviderError {
    pub fn transport(provider: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: err.to_string(),
        }
    }

    pub fn malformed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Terminal errors of the extraction endpoint.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    NoIngredientsFound(String),

    #[error("{0}")]
    AllProvidersQuotaExceeded(String),
}

impl ExtractError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoIngredientsFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::AllProvidersQuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::BadRequest(msg) | Self::Configuration(msg) => json!({ "error": msg }),
            Self::NoIngredientsFound(msg) => json!({ "error": msg, "isQuotaError": false }),
            Self::AllProvidersQuotaExceeded(msg) => json!({ "error": msg, "isQuotaError": true }),
        };
        (status, Json(body)).into_response()
    }
}
