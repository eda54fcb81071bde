pub mod memory_cache;
pub mod redis_cache;

pub use memory_cache::InMemoryCache;
pub use redis_cache::RedisCache;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache command failed: {0}")]
    Command(#[from] redis::RedisError),
}

/// Key/value store with per-entry expiry. Values are opaque strings
/// (JSON in practice); callers own the encoding.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// `Ok(None)` on a miss
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
