use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, info};

use crate::{CacheError, ResultCache};

/// Redis-backed cache shared with other services
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {}", e)))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        info!("Redis cache initialized");
        Ok(Self { conn })
    }

    /// Round-trip check, run once at startup
    pub async fn ping(&self) -> Result<(), CacheError> {
        let _: String = redis::cmd("PING")
            .query_async(&mut self.conn.clone())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ResultCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let value: Option<String> = self.conn.clone().get(key).await?;
        debug!(key, hit = value.is_some(), "Redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        let _: () = self.conn.clone().set_ex(key, value, seconds).await?;
        debug!(key, ttl_secs = seconds, "Redis SETEX");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let _: () = self.conn.clone().del(key).await?;
        debug!(key, "Redis DEL");
        Ok(())
    }
}
