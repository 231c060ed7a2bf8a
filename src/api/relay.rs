//! The chat relay: forwards a client request upstream and streams the
//! response body back line-by-line.
//!
//! The outgoing request carries a fixed browser-like header set and a body
//! whose `model` field is forced to the configured value; clients do not
//! choose the model. The shared HTTP client never follows redirects and
//! keeps one cookie jar for the process lifetime.

use crate::api::handlers::AppState;
use crate::api::streaming::{forward_all, line_stream};
use crate::core::error::{AppError, Result};
use crate::core::logging::{generate_request_id, REQUEST_ID};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::Response,
};
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;

pub const UPSTREAM_ORIGIN: &str = "https://platform.openai.com/playground";
pub const UPSTREAM_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.88 Safari/537.36";

/// Handle `/v1/chat`: rewrite, authorize, forward, stream back.
#[tracing::instrument(skip(state, headers, body))]
pub async fn proxy_chat(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let request_id = generate_request_id();

    REQUEST_ID.scope(request_id.clone(), async move {
        // Parse and rewrite the body: the model field is always ours.
        let mut payload: serde_json::Map<String, Value> = serde_json::from_slice(&body)?;
        payload.insert(
            "model".to_string(),
            Value::String(state.config.forced_model.clone()),
        );
        let outgoing_body = serde_json::to_vec(&payload)?;

        // Client-supplied Authorization passes through untouched and
        // unverified; only anonymous requests draw from the pool.
        let authorization = match headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        {
            Some(value) => value.to_string(),
            None => format!("Bearer {}", state.pool.select(None).await?),
        };

        let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
            .unwrap_or(reqwest::Method::POST);

        let upstream = state
            .http_client
            .request(method, &state.config.upstream_url)
            .header("Host", state.config.upstream_host())
            .header("Origin", UPSTREAM_ORIGIN)
            .header("Content-Type", "application/json")
            .header("Connection", "keep-alive")
            .header("Keep-Alive", "timeout=360")
            .header("User-Agent", UPSTREAM_USER_AGENT)
            .header("Authorization", authorization)
            .body(outgoing_body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    request_id = %request_id,
                    url = %state.config.upstream_url,
                    error = %e,
                    error_source = ?e.source(),
                    is_timeout = e.is_timeout(),
                    is_connect = e.is_connect(),
                    "upstream request failed"
                );
                AppError::from(e)
            })?;

        tracing::debug!(
            request_id = %request_id,
            status = %upstream.status(),
            "upstream responded, streaming body"
        );

        // Propagate status, content type and (for unfollowed redirects)
        // Location as-is.
        let status = StatusCode::from_u16(upstream.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = upstream
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let location = upstream
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut builder = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(location) = location {
            builder = builder.header(header::LOCATION, location);
        }

        let body = Body::from_stream(line_stream(upstream.bytes_stream(), forward_all));
        builder
            .body(body)
            .map_err(|e| AppError::Internal(e.to_string()))
    })
    .await
}
