use super::CacheStore;
use crate::error::Result;
use async_trait::async_trait;
use redis::Client;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// Cache entries in Redis, expiring through `SET .. EX`.
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: ConnectionManager,
}

impl RedisCacheStore {
    /// Connects and verifies the server answers `PING`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        let mut probe = connection.clone();
        redis::cmd("PING").query_async::<_, String>(&mut probe).await?;

        tracing::info!("Connected to Redis cache");
        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        Ok(redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await?)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}
