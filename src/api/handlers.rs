//! HTTP handlers and routing for the key pool proxy.
//!
//! Three entry points call into the pool (`submit`, `delete`) and the relay
//! (`/v1/chat`); `/ping` and the OPTIONS catch-all are liveness and CORS
//! plumbing.

use crate::api::models::{ApiKeySubmission, MessageResponse};
use crate::api::relay::proxy_chat;
use crate::core::config::AppConfig;
use crate::core::error::Result;
use crate::services::balance::CreditSummary;
use crate::services::pool::CredentialPool;
use axum::{
    extract::State,
    http::{header, HeaderValue},
    routing::{get, options, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// Shared application state.
pub struct AppState {
    pub config: AppConfig,
    pub pool: CredentialPool,
    /// Single client shared across all relay operations, cookie jar
    /// included. Upstream cookies therefore span client requests; accepted
    /// risk, see DESIGN.md.
    pub http_client: reqwest::Client,
}

/// Handle `/api_key/submit`: balance-check the key and admit it to the pool.
#[tracing::instrument(skip(state, submission))]
pub async fn submit_api_key(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<ApiKeySubmission>,
) -> Result<Json<CreditSummary>> {
    let summary = state.pool.submit(&submission.api_key).await?;
    Ok(Json(summary))
}

/// Handle `/api_key/delete`: remove the key from the pool.
#[tracing::instrument(skip(state, submission))]
pub async fn delete_api_key(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<ApiKeySubmission>,
) -> Result<Json<MessageResponse>> {
    state.pool.delete(&submission.api_key).await?;
    Ok(Json(MessageResponse::new("API key deleted")))
}

/// Liveness probe.
pub async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse::new("pong"))
}

/// CORS preflight response for any path.
pub async fn preflight() -> Json<MessageResponse> {
    Json(MessageResponse::new("ok"))
}

/// Build the application router with all endpoints and layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping).options(preflight))
        .route("/api_key/submit", post(submit_api_key).options(preflight))
        .route("/api_key/delete", post(delete_api_key).options(preflight))
        .route("/v1/chat", post(proxy_chat).options(preflight))
        .route("/*path", options(preflight))
        // Plain header layers rather than a CORS middleware: preflight
        // requests must still reach the OPTIONS handlers above.
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
