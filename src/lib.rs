//! Credit-aware reverse proxy for a chat-completion API.
//!
//! Clients send chat requests without needing their own credentials: the
//! proxy either passes through a client-supplied `Authorization` header or
//! draws a key from a shared pool of previously submitted keys, forwards the
//! request upstream and streams the response back line-by-line.
//!
//! # Architecture
//!
//! - [`core`]: configuration, error handling, logging context
//! - [`services`]: credential store, balance checker, credential pool
//! - [`api`]: HTTP handlers, the chat relay and streaming support
//!
//! # Configuration
//!
//! `REDIS_URL` is required; see [`core::config::AppConfig`] for the optional
//! variables (upstream endpoint, forced model, credit threshold, selection
//! retry bound, timeouts).

pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use api::{router, AppState};
pub use core::{AppConfig, AppError, Result, ServerConfig};
pub use services::{
    CredentialPool, CredentialStore, CreditChecker, CreditSummary, HttpCreditChecker, MemoryStore,
    PoolPolicy, RedisStore,
};
