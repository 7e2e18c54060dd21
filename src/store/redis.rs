use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::SharedStore;
use crate::error::Result;

/// Redis-backed store.
///
/// Holds a [`ConnectionManager`], which reconnects on its own after the server
/// drops the connection, so a store outage surfaces as per-call errors rather
/// than a dead client.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the store at `addr` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(addr: &str) -> Result<Self> {
        let client = redis::Client::open(addr)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!(addr, "Connected to shared store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl SharedStore for RedisStore {
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        // SET EX takes whole seconds
        let secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, secs).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn push(&self, list: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(list, value).await?;
        Ok(())
    }
}
