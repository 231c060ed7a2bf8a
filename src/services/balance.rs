//! Remaining-credit lookup against the upstream provider.
//!
//! A pure read: checking a key's balance never mutates the pool. The checker
//! sits behind a trait so the pool logic can be exercised without network
//! access.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Timeout for the billing lookup, separate from the long relay timeout.
const BILLING_TIMEOUT_SECS: u64 = 30;

/// Billing summary returned by the provider for one API key.
///
/// `hard_limit_usd` is the usable-balance figure the pool gates on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditSummary {
    pub has_payment_method: bool,
    pub soft_limit_usd: f64,
    pub hard_limit_usd: f64,
    pub system_hard_limit_usd: f64,
}

/// Errors from the balance check call itself.
#[derive(Error, Debug)]
pub enum CreditCheckError {
    /// Transport-level failure reaching the billing endpoint
    #[error("billing request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Billing endpoint answered with a non-success status
    #[error("billing endpoint returned status {0}")]
    Status(u16),
}

/// Queries the provider for a key's current usable balance.
#[async_trait]
pub trait CreditChecker: Send + Sync {
    async fn check(&self, api_key: &str) -> Result<CreditSummary, CreditCheckError>;
}

/// HTTP implementation of [`CreditChecker`] against the provider's billing
/// subscription endpoint.
pub struct HttpCreditChecker {
    client: reqwest::Client,
    billing_url: String,
}

impl HttpCreditChecker {
    pub fn new(billing_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(BILLING_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            billing_url: billing_url.into(),
        }
    }
}

#[async_trait]
impl CreditChecker for HttpCreditChecker {
    async fn check(&self, api_key: &str) -> Result<CreditSummary, CreditCheckError> {
        let response = self
            .client
            .get(&self.billing_url)
            .bearer_auth(api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "billing endpoint rejected check");
            return Err(CreditCheckError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_check_parses_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dashboard/billing/subscription"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "has_payment_method": true,
                "soft_limit_usd": 100.0,
                "hard_limit_usd": 120.0,
                "system_hard_limit_usd": 120.0
            })))
            .mount(&server)
            .await;

        let checker =
            HttpCreditChecker::new(format!("{}/dashboard/billing/subscription", server.uri()));
        let summary = checker.check("sk-test").await.unwrap();
        assert_eq!(summary.hard_limit_usd, 120.0);
        assert!(summary.has_payment_method);
    }

    #[tokio::test]
    async fn test_check_tolerates_missing_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"hard_limit_usd": 3.5})),
            )
            .mount(&server)
            .await;

        let checker = HttpCreditChecker::new(server.uri());
        let summary = checker.check("sk-test").await.unwrap();
        assert_eq!(summary.hard_limit_usd, 3.5);
        assert!(!summary.has_payment_method);
    }

    #[tokio::test]
    async fn test_check_surfaces_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let checker = HttpCreditChecker::new(server.uri());
        let err = checker.check("sk-bad").await.unwrap_err();
        assert!(matches!(err, CreditCheckError::Status(401)));
    }
}
