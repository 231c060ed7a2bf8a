//! Credential store backends.
//!
//! The pool only needs three operations from its backing store: overwrite a
//! key with its last-known balance (no expiration), remove a key (idempotent),
//! and draw one arbitrary key. [`RedisStore`] is the shared production
//! backend so pool state survives restarts and is visible to every proxy
//! instance; [`MemoryStore`] backs tests and single-process runs.

use async_trait::async_trait;
use dashmap::DashMap;
use rand::Rng;
use redis::aio::ConnectionManager;
use thiserror::Error;

/// Errors surfaced by a credential store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis command or connection failure
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Key-value mapping from API key to last-known balance.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert or overwrite a key with its last-known balance. Entries never
    /// expire by time.
    async fn put(&self, api_key: &str, balance: f64) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key is a successful no-op.
    async fn remove(&self, api_key: &str) -> Result<(), StoreError>;

    /// Draw one arbitrary key, or `None` when the store is empty.
    async fn random_key(&self) -> Result<Option<String>, StoreError>;
}

/// Redis-backed credential store shared by all proxy instances.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Open a connection-managed client against the given Redis URL.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl CredentialStore for RedisStore {
    async fn put(&self, api_key: &str, balance: f64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = redis::AsyncCommands::set(&mut conn, api_key, balance).await?;
        Ok(())
    }

    async fn remove(&self, api_key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = redis::AsyncCommands::del(&mut conn, api_key).await?;
        Ok(())
    }

    async fn random_key(&self) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let key: Option<String> = redis::cmd("RANDOMKEY").query_async(&mut conn).await?;
        Ok(key)
    }
}

/// In-memory credential store.
///
/// Process-local; pool state does not outlive the process or reach other
/// instances. Used by the test suite and available for single-process runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, f64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, api_key: &str) -> bool {
        self.entries.contains_key(api_key)
    }

    /// Last-known balance for a key, if present.
    pub fn balance(&self, api_key: &str) -> Option<f64> {
        self.entries.get(api_key).map(|entry| *entry.value())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn put(&self, api_key: &str, balance: f64) -> Result<(), StoreError> {
        self.entries.insert(api_key.to_string(), balance);
        Ok(())
    }

    async fn remove(&self, api_key: &str) -> Result<(), StoreError> {
        self.entries.remove(api_key);
        Ok(())
    }

    async fn random_key(&self) -> Result<Option<String>, StoreError> {
        let keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        if keys.is_empty() {
            return Ok(None);
        }
        let index = rand::thread_rng().gen_range(0..keys.len());
        Ok(Some(keys[index].clone()))
    }
}
