//! Credential pool admission and selection.
//!
//! Combines the store and the balance checker: `submit` admits keys whose
//! checked balance clears the threshold, `delete` removes them, and `select`
//! draws a usable key for an outgoing request, evicting exhausted entries
//! with a bounded number of redraws.

use crate::core::config::{DEFAULT_MIN_CREDIT_USD, DEFAULT_SELECT_MAX_ATTEMPTS};
use crate::core::error::{AppError, Result};
use crate::services::balance::{CreditChecker, CreditSummary};
use crate::services::store::CredentialStore;
use std::sync::Arc;

/// Pool admission/selection policy.
///
/// Both constants are deliberate policy knobs rather than invariants: the
/// retry cap trades completeness for a predictable worst case when repeated
/// random draws keep hitting exhausted entries.
#[derive(Debug, Clone)]
pub struct PoolPolicy {
    /// Minimum usable balance (USD) for a key to enter or stay in the pool
    pub min_credit_usd: f64,

    /// Maximum random draws per anonymous selection
    pub max_select_attempts: u32,
}

impl Default for PoolPolicy {
    fn default() -> Self {
        Self {
            min_credit_usd: DEFAULT_MIN_CREDIT_USD,
            max_select_attempts: DEFAULT_SELECT_MAX_ATTEMPTS,
        }
    }
}

/// Shared pool of submitted API keys.
pub struct CredentialPool {
    store: Arc<dyn CredentialStore>,
    checker: Arc<dyn CreditChecker>,
    policy: PoolPolicy,
}

impl CredentialPool {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        checker: Arc<dyn CreditChecker>,
        policy: PoolPolicy,
    ) -> Self {
        Self {
            store,
            checker,
            policy,
        }
    }

    /// Validate a key's balance and admit it to the pool.
    ///
    /// The balance summary is returned to the caller immediately; the store
    /// write happens on a detached task. A persist failure is logged and
    /// never surfaced — the caller already has its answer by then.
    pub async fn submit(&self, api_key: &str) -> Result<CreditSummary> {
        if api_key.is_empty() {
            return Err(AppError::EmptyApiKey);
        }

        let summary = self.checker.check(api_key).await?;
        if summary.hard_limit_usd < self.policy.min_credit_usd {
            tracing::info!(
                balance = summary.hard_limit_usd,
                "rejecting api key below credit threshold"
            );
            return Err(AppError::InsufficientCredit);
        }

        let store = Arc::clone(&self.store);
        let key = api_key.to_string();
        let balance = summary.hard_limit_usd;
        tokio::spawn(async move {
            if let Err(e) = store.put(&key, balance).await {
                tracing::error!(error = %e, "failed to persist api key to store");
            }
        });

        Ok(summary)
    }

    /// Remove a key from the pool. Idempotent: deleting an absent key
    /// succeeds.
    pub async fn delete(&self, api_key: &str) -> Result<()> {
        if api_key.is_empty() {
            return Err(AppError::EmptyApiKey);
        }
        self.store.remove(api_key).await?;
        Ok(())
    }

    /// Resolve the credential for an outgoing request.
    ///
    /// A non-empty explicit credential is returned unchanged with no pool or
    /// balance interaction. Otherwise keys are drawn at random from the
    /// store; entries whose live balance has dropped below the threshold are
    /// evicted and the draw repeats, up to `max_select_attempts` times.
    ///
    /// Selection does not reserve the key: concurrent requests may use the
    /// same credential simultaneously.
    pub async fn select(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(key) = explicit.filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }

        for attempt in 0..self.policy.max_select_attempts {
            let candidate = match self.store.random_key().await? {
                Some(key) => key,
                // An empty first draw means the pool has no members at all;
                // a miss after evictions means this selection drained it.
                None if attempt == 0 => return Err(AppError::PoolEmpty),
                None => return Err(AppError::NoUsableKey { attempts: attempt }),
            };

            // A transient check failure is not evidence the key is bad:
            // surface the error and leave the entry in place.
            let summary = self.checker.check(&candidate).await?;

            if summary.hard_limit_usd >= self.policy.min_credit_usd {
                return Ok(candidate);
            }

            tracing::info!(
                attempt,
                balance = summary.hard_limit_usd,
                "evicting exhausted api key from pool"
            );
            if let Err(e) = self.store.remove(&candidate).await {
                tracing::error!(error = %e, "failed to evict api key from store");
            }
        }

        Err(AppError::NoUsableKey {
            attempts: self.policy.max_select_attempts,
        })
    }
}
