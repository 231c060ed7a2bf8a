//! API layer for the key pool proxy.
//!
//! This module contains the HTTP handlers, request/response models,
//! the chat relay and its line-framed streaming support.

pub mod handlers;
pub mod models;
pub mod relay;
pub mod streaming;

// Re-export commonly used types
pub use handlers::{delete_api_key, ping, preflight, router, submit_api_key, AppState};
pub use models::{ApiKeySubmission, MessageResponse};
pub use relay::proxy_chat;
pub use streaming::{forward_all, line_stream};
