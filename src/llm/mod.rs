//! Language-model providers and the ingredient parsers built on them.
//!
//! [`LanguageModel`] is the seam the orchestrator depends on; the real
//! implementation is [`ChatCompletionClient`], tests plug in scripted models.

pub mod client;
pub mod parser;
pub mod prompts;
pub mod reply;

pub use client::{ChatCompletionClient, LlmProviderKind, Message};
pub use parser::{parse_ingredients, IngredientTask};

use crate::error::ProviderError;

/// Async trait implemented by each chat-completion backend.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short provider name used in logs and analysis method tags.
    fn label(&self) -> &str;
    fn supports_images(&self) -> bool;
    async fn complete(&self, messages: Vec<Message>) -> Result<String, ProviderError>;
}
