//! Process configuration.
//!
//! Read once at start-up from the environment (after `.env` is loaded). Provider
//! credentials that are missing or blank mean the provider is unavailable; the
//! orchestrator never looks at the environment itself.

use anyhow::{Context, Result};
use std::net::SocketAddr;

use crate::llm::LlmProviderKind;
use crate::vision::DEFAULT_GOOGLE_VISION_URL;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_PAYSTACK_URL: &str = "https://api.paystack.co";
/// Minimum accepted payment, in the currency's minor unit.
pub const DEFAULT_PAYSTACK_MIN_AMOUNT: u64 = 100_000;

/// Credentials and endpoint for one chat-completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub kind: LlmProviderKind,
    pub api_key: String,
    pub model: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionConfig {
    pub api_key: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    pub secret_key: Option<String>,
    pub url: String,
    pub min_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub vision: Option<VisionConfig>,
    /// Configured language models, provider A (Deepseek) before provider B (OpenAI).
    pub llms: Vec<LlmConfig>,
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        let vision = get("GOOGLE_VISION_API_KEY").map(|api_key| VisionConfig {
            api_key,
            url: get("GOOGLE_VISION_URL").unwrap_or_else(|| DEFAULT_GOOGLE_VISION_URL.to_string()),
        });

        let llms = [
            (LlmProviderKind::Deepseek, "DEEPSEEK"),
            (LlmProviderKind::OpenAi, "OPENAI"),
        ]
        .into_iter()
        .filter_map(|(kind, prefix)| {
            let api_key = get(&format!("{}_API_KEY", prefix))?;
            Some(LlmConfig {
                kind,
                api_key,
                model: get(&format!("{}_MODEL", prefix))
                    .unwrap_or_else(|| kind.default_model().to_string()),
                url: get(&format!("{}_API_URL", prefix))
                    .unwrap_or_else(|| kind.default_url().to_string()),
            })
        })
        .collect();

        let min_amount = match get("PAYSTACK_MIN_AMOUNT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PAYSTACK_MIN_AMOUNT is not a whole number: {}", raw))?,
            None => DEFAULT_PAYSTACK_MIN_AMOUNT,
        };

        let payment = PaymentConfig {
            secret_key: get("PAYSTACK_SECRET_KEY"),
            url: get("PAYSTACK_API_URL").unwrap_or_else(|| DEFAULT_PAYSTACK_URL.to_string()),
            min_amount,
        };

        Ok(Self {
            bind_addr,
            vision,
            llms,
            payment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_nothing_configured() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.vision.is_none());
        assert!(config.llms.is_empty());
        assert_eq!(config.payment.secret_key, None);
        assert_eq!(config.payment.min_amount, DEFAULT_PAYSTACK_MIN_AMOUNT);
    }

    #[test]
    fn test_provider_order_and_overrides() {
        let config = load(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("DEEPSEEK_API_KEY", "sk-deepseek"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("GOOGLE_VISION_API_KEY", "g-key"),
        ])
        .unwrap();

        let kinds: Vec<_> = config.llms.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LlmProviderKind::Deepseek, LlmProviderKind::OpenAi]);
        assert_eq!(config.llms[0].model, "deepseek-chat");
        assert_eq!(config.llms[1].model, "gpt-4o");
        assert_eq!(
            config.vision.unwrap().url,
            DEFAULT_GOOGLE_VISION_URL.to_string()
        );
    }

    #[test]
    fn test_blank_key_is_absent() {
        let config = load(&[("DEEPSEEK_API_KEY", "   "), ("GOOGLE_VISION_API_KEY", "")]).unwrap();
        assert!(config.llms.is_empty());
        assert!(config.vision.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("BIND_ADDR", "not-an-addr")]).is_err());
        assert!(load(&[("PAYSTACK_MIN_AMOUNT", "ten")]).is_err());
    }
}
