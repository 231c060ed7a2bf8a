//! Configuration for the key pool proxy.
//!
//! All settings come from environment variables (with `.env` support via
//! dotenvy in `main`). Policy constants such as the credit threshold and the
//! selection retry bound are configuration fields, not literals.

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration (host, port)
    pub server: ServerConfig,

    /// Redis connection URL for the shared credential store
    pub redis_url: String,

    /// Upstream chat-completion endpoint
    pub upstream_url: String,

    /// Billing endpoint used for credit checks
    pub billing_url: String,

    /// Model name forced into every outgoing request body
    pub forced_model: String,

    /// Minimum usable credit (USD) for a key to enter or stay in the pool
    pub min_credit_usd: f64,

    /// Maximum random draws per anonymous selection before giving up
    pub select_max_attempts: u32,

    /// Request timeout in seconds for the upstream chat call
    pub request_timeout_secs: u64,
}

/// Server-specific configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_BILLING_URL: &str = "https://api.openai.com/dashboard/billing/subscription";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MIN_CREDIT_USD: f64 = 1.0;
pub const DEFAULT_SELECT_MAX_ATTEMPTS: u32 = 6;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 360;

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// `REDIS_URL` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let redis_url =
            std::env::var("REDIS_URL").context("REDIS_URL environment variable is required")?;

        let mut server = ServerConfig::default();
        if let Ok(host) = std::env::var("HOST") {
            server.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            server.port = port_str
                .parse::<u16>()
                .with_context(|| format!("invalid PORT value: {}", port_str))?;
        }

        Ok(Self {
            server,
            redis_url,
            upstream_url: env_or("UPSTREAM_URL", DEFAULT_UPSTREAM_URL),
            billing_url: env_or("BILLING_URL", DEFAULT_BILLING_URL),
            forced_model: env_or("UPSTREAM_MODEL", DEFAULT_MODEL),
            min_credit_usd: env_parse("MIN_CREDIT_USD", DEFAULT_MIN_CREDIT_USD)?,
            select_max_attempts: env_parse("SELECT_MAX_ATTEMPTS", DEFAULT_SELECT_MAX_ATTEMPTS)?,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
        })
    }

    /// Host component of the upstream URL, used for the outgoing Host header.
    pub fn upstream_host(&self) -> &str {
        let rest = self
            .upstream_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.upstream_url);
        rest.split('/').next().unwrap_or(rest)
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("invalid {} value: {}", name, value)),
        Err(_) => Ok(default),
    }
}
