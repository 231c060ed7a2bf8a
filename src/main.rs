//! Key pool proxy - main entry point.
//!
//! Connects to the shared Redis store, builds the shared upstream HTTP
//! client and serves the router.

use anyhow::Result;
use keyshare_proxy::{
    router, AppConfig, AppState, CredentialPool, HttpCreditChecker, PoolPolicy, RedisStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to credential store...");
    let store = RedisStore::connect(&config.redis_url).await?;
    tracing::info!("Credential store connected");

    let checker = HttpCreditChecker::new(config.billing_url.clone());
    let policy = PoolPolicy {
        min_credit_usd: config.min_credit_usd,
        max_select_attempts: config.select_max_attempts,
    };
    let pool = CredentialPool::new(Arc::new(store), Arc::new(checker), policy);

    let http_client = create_http_client(&config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState {
        config,
        pool,
        http_client,
    });
    let app = router(state);

    tracing::info!("Starting key pool proxy on {}", addr);
    tracing::info!("Key pool API: /api_key/submit, /api_key/delete");
    tracing::info!("Chat relay: /v1/chat");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize logging.
///
/// Noisy HTTP library logs are always suppressed, even when RUST_LOG is set
/// to a blanket level that would otherwise let them through.
fn init_tracing() {
    let base_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,keyshare_proxy=debug".to_string());
    let filter_str = format!("{},hyper=warn,h2=warn,reqwest=warn", base_filter);
    let filter = tracing_subscriber::EnvFilter::new(filter_str);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create the single HTTP client shared by all relay operations.
///
/// Redirects are never followed so the real upstream status reaches the
/// client, and the cookie jar persists for the process lifetime.
fn create_http_client(config: &AppConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .build()
        .expect("Failed to build HTTP client")
}
