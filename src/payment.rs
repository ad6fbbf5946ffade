//! Payment-gateway client: verifies a completed checkout by its reference.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::PaymentConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Payment verification is not configured")]
    NotConfigured,

    /// The transaction exists but does not qualify (caller error, HTTP 400).
    #[error("{0}")]
    Rejected(String),

    /// The gateway could not be reached or answered with an error (HTTP 500).
    #[error("Payment provider error: {0}")]
    Provider(String),
}

/// A verified premium purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    pub reference: String,
    pub email: String,
    pub user_id: Option<String>,
}

#[derive(Clone)]
pub struct PaymentClient {
    client: Client,
    config: PaymentConfig,
}

// ── Gateway response types ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<Transaction>,
}

#[derive(Deserialize)]
struct Transaction {
    #[serde(default)]
    status: String,
    #[serde(default)]
    reference: String,
    #[serde(default)]
    amount: u64,
    #[serde(default)]
    customer: Option<Customer>,
    #[serde(default)]
    metadata: serde_json::Value,
}

#[derive(Deserialize)]
struct Customer {
    #[serde(default)]
    email: String,
}

impl PaymentClient {
    pub fn new(client: Client, config: PaymentConfig) -> Self {
        Self { client, config }
    }

    pub async fn verify(&self, reference: &str) -> Result<PaymentVerification, PaymentError> {
        let secret = self
            .config
            .secret_key
            .as_deref()
            .ok_or(PaymentError::NotConfigured)?;

        let reference = reference.trim();
        if reference.is_empty() {
            return Err(PaymentError::Rejected("Payment reference is required".to_string()));
        }

        let mut url = reqwest::Url::parse(&self.config.url)
            .map_err(|e| PaymentError::Provider(format!("Invalid payment URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PaymentError::Provider("Invalid payment URL".to_string()))?
            .pop_if_empty()
            .extend(["transaction", "verify", reference]);
        debug!("Verifying payment reference {}", reference);

        let resp = self
            .client
            .get(url)
            .bearer_auth(secret)
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PaymentError::Provider(format!("{} - {}", status, text)));
        }

        let body: VerifyResponse = resp
            .json()
            .await
            .map_err(|e| PaymentError::Provider(format!("Invalid response: {}", e)))?;

        let tx = match body.data {
            Some(tx) if body.status => tx,
            _ => return Err(PaymentError::Provider(body.message)),
        };

        if tx.status != "success" {
            return Err(PaymentError::Rejected(format!(
                "Transaction was not successful (status: {})",
                tx.status
            )));
        }

        if tx.amount < self.config.min_amount {
            return Err(PaymentError::Rejected(format!(
                "Amount paid ({}) is below the required {}",
                tx.amount, self.config.min_amount
            )));
        }

        let user_id = ["userId", "user_id"]
            .iter()
            .find_map(|key| tx.metadata.get(key))
            .and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        info!("Payment {} verified for user {:?}", tx.reference, user_id);

        Ok(PaymentVerification {
            reference: tx.reference,
            email: tx.customer.map(|c| c.email).unwrap_or_default(),
            user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::Server, secret: Option<&str>) -> PaymentClient {
        PaymentClient::new(
            Client::new(),
            PaymentConfig {
                secret_key: secret.map(String::from),
                url: server.url(),
                min_amount: 100_000,
            },
        )
    }

    fn verify_body(status: &str, amount: u64) -> String {
        format!(
            r#"{{"status":true,"message":"Verification successful","data":{{"status":"{}","reference":"ref_123","amount":{},"customer":{{"email":"cook@example.com"}},"metadata":{{"userId":"user-42"}}}}}}"#,
            status, amount
        )
    }

    #[tokio::test]
    async fn test_successful_verification() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/transaction/verify/ref_123")
            .match_header("authorization", "Bearer sk_test")
            .with_status(200)
            .with_body(verify_body("success", 150_000))
            .create_async()
            .await;

        let verified = client(&server, Some("sk_test")).verify("ref_123").await.unwrap();
        assert_eq!(
            verified,
            PaymentVerification {
                reference: "ref_123".into(),
                email: "cook@example.com".into(),
                user_id: Some("user-42".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_failed_or_short_payment_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/transaction/verify/ref_123")
            .with_status(200)
            .with_body(verify_body("abandoned", 150_000))
            .create_async()
            .await;
        let err = client(&server, Some("sk_test")).verify("ref_123").await.unwrap_err();
        assert!(matches!(err, PaymentError::Rejected(_)));

        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/transaction/verify/ref_123")
            .with_status(200)
            .with_body(verify_body("success", 5_000))
            .create_async()
            .await;
        let err = client(&server, Some("sk_test")).verify("ref_123").await.unwrap_err();
        assert!(err.to_string().contains("below the required 100000"));
    }

    #[tokio::test]
    async fn test_missing_secret_and_blank_reference() {
        let server = mockito::Server::new_async().await;
        assert_eq!(
            client(&server, None).verify("ref_123").await.unwrap_err(),
            PaymentError::NotConfigured
        );
        assert!(matches!(
            client(&server, Some("sk_test")).verify("  ").await.unwrap_err(),
            PaymentError::Rejected(_)
        ));
    }

    #[tokio::test]
    async fn test_gateway_error_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/transaction/verify/missing")
            .with_status(404)
            .with_body(r#"{"status":false,"message":"Transaction reference not found"}"#)
            .create_async()
            .await;
        let err = client(&server, Some("sk_test")).verify("missing").await.unwrap_err();
        assert!(matches!(err, PaymentError::Provider(_)));
    }

    #[tokio::test]
    async fn test_reference_is_a_single_path_segment() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/transaction/verify/ref%2F1%3Fx")
            .with_status(200)
            .with_body(verify_body("success", 150_000))
            .create_async()
            .await;

        let verified = client(&server, Some("sk_test")).verify("ref/1?x").await.unwrap();
        assert_eq!(verified.reference, "ref_123");
    }
}
