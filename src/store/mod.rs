//! Shared state store used for liveness markers and job results.
//!
//! The worker treats the store as an external, internally consistent service.
//! Components receive it as an `Arc<dyn SharedStore>` so tests can swap in
//! [`MemoryStore`].

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// List key the result reporter pushes onto.
pub const JOB_RESULTS_KEY: &str = "job_results";

/// Value written as the liveness marker.
pub const ALIVE: &str = "alive";

/// Key of the liveness marker for a worker identity.
pub fn liveness_key(worker_url: &str) -> String {
    format!("worker:{}", worker_url)
}

#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Set `key` to `value`, expiring after `ttl`.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Push `value` onto the head of the list at `list`.
    async fn push(&self, list: &str, value: &str) -> Result<()>;
}
