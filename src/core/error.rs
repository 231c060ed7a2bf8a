//! Error types and handling for the key pool proxy.
//!
//! This module provides a unified error type [`AppError`] that wraps the
//! pool, store, billing and relay failure modes and converts them to the
//! flat `{"error": "..."}` JSON responses the API exposes.

use crate::services::balance::CreditCheckError;
use crate::services::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client submitted or referenced an empty API key
    #[error("API key is empty")]
    EmptyApiKey,

    /// Submitted key has a balance below the configured minimum
    #[error("Not enough credits")]
    InsufficientCredit,

    /// Client request body is not a JSON object
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The balance check call itself failed (network or provider error)
    #[error("Credit check failed: {0}")]
    CreditCheck(#[from] CreditCheckError),

    /// Anonymous selection against an empty pool
    #[error("API key pool is empty")]
    PoolEmpty,

    /// No key with sufficient balance found within the retry bound
    #[error("No usable API key after {attempts} attempts")]
    NoUsableKey { attempts: u32 },

    /// Key-value store backend failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Transport failure talking to the upstream chat endpoint
    #[error("Upstream request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Generic internal server errors with custom message
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::EmptyApiKey | AppError::InsufficientCredit => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::MalformedBody(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Request(ref e) => {
                if e.is_timeout() {
                    (StatusCode::GATEWAY_TIMEOUT, "Gateway timeout".to_string())
                } else {
                    (StatusCode::BAD_GATEWAY, self.to_string())
                }
            }
            AppError::CreditCheck(_)
            | AppError::PoolEmpty
            | AppError::NoUsableKey { .. }
            | AppError::Store(_)
            | AppError::Config(_)
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AppError::EmptyApiKey.to_string(), "API key is empty");
        assert_eq!(
            AppError::InsufficientCredit.to_string(),
            "Not enough credits"
        );
        assert_eq!(
            AppError::NoUsableKey { attempts: 6 }.to_string(),
            "No usable API key after 6 attempts"
        );
        assert_eq!(AppError::PoolEmpty.to_string(), "API key pool is empty");
    }

    #[test]
    fn test_empty_api_key_response() {
        let response = AppError::EmptyApiKey.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_insufficient_credit_response() {
        let response = AppError::InsufficientCredit.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_malformed_body_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let response = AppError::MalformedBody(json_err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_pool_errors_are_server_errors() {
        let response = AppError::PoolEmpty.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::NoUsableKey { attempts: 6 }.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_error_response() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_from_anyhow() {
        let app_err: AppError = anyhow::anyhow!("missing env").into();
        assert!(matches!(app_err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = AppError::InsufficientCredit.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Not enough credits");
    }
}
