//! Business logic for the key pool proxy.
//!
//! - [`store`]: credential store backends (Redis, in-memory)
//! - [`balance`]: remaining-credit lookup against the upstream provider
//! - [`pool`]: admission, deletion and bounded-retry selection

pub mod balance;
pub mod pool;
pub mod store;

// Re-export commonly used types
pub use balance::{CreditChecker, CreditSummary, HttpCreditChecker};
pub use pool::{CredentialPool, PoolPolicy};
pub use store::{CredentialStore, MemoryStore, RedisStore};
