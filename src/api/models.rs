//! Request/response models for the key management endpoints.

use serde::{Deserialize, Serialize};

/// Body of `/api_key/submit` and `/api_key/delete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeySubmission {
    /// A missing field binds as empty and is rejected by the pool.
    #[serde(default)]
    pub api_key: String,
}

/// Simple `{"message": ...}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_defaults_missing_key_to_empty() {
        let submission: ApiKeySubmission = serde_json::from_str("{}").unwrap();
        assert_eq!(submission.api_key, "");
    }

    #[test]
    fn test_submission_binds_key() {
        let submission: ApiKeySubmission =
            serde_json::from_str(r#"{"api_key":"sk-test"}"#).unwrap();
        assert_eq!(submission.api_key, "sk-test");
    }
}
