//! Read-through caching of computed JSON payloads.
//!
//! [`CacheAside::get_or_compute`] returns a stored value while its TTL has
//! not elapsed, and otherwise runs the computation once and stores its
//! outcome. "Not found" outcomes are stored too; other failures are not.
//! Concurrent misses on one key may each compute: computations are
//! read-only, so the last store wins.

mod memory;
mod redis_store;

pub use memory::MemoryCacheStore;
pub use redis_store::RedisCacheStore;

use crate::error::{Backend, EngineError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// String-keyed storage with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Stored value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}

/// Expiry cadence of a cached payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    Hourly,
    Daily,
    Fixed(Duration),
}

impl TtlClass {
    pub const fn duration(self) -> Duration {
        match self {
            Self::Hourly => Duration::from_secs(60 * 60),
            Self::Daily => Duration::from_secs(24 * 60 * 60),
            Self::Fixed(ttl) => ttl,
        }
    }
}

/// Cache key for the topic widget. Parts are percent-encoded so no two
/// requests share a key.
pub fn topic_widget_key(package: &str, topic: &str) -> String {
    format!("light:topic:{}:{}", urlencoding::encode(package), urlencoding::encode(topic))
}

/// Cache key for the package widget.
pub fn package_widget_key(package: &str) -> String {
    format!("light:package:{}", urlencoding::encode(package))
}

/// Stored form of a computed outcome.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Entry<T> {
    Found { value: T },
    Missing { what: String },
}

/// Get-or-compute wrapper over a shared [`CacheStore`].
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
}

impl std::fmt::Debug for CacheAside {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAside").finish_non_exhaustive()
    }
}

impl CacheAside {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Returns the cached outcome for `key`, or computes and stores it.
    ///
    /// A stored "not found" is returned as [`EngineError::NotFound`] without
    /// computing. Cache read and write failures are returned as-is.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, ttl: TtlClass, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        if let Some(raw) = self.store.get(key).await? {
            tracing::debug!(key, "Cache hit");
            return match decode::<T>(&raw)? {
                Entry::Found { value } => Ok(value),
                Entry::Missing { what } => Err(EngineError::NotFound { what }),
            };
        }

        tracing::debug!(key, "Cache miss");
        match compute().await {
            Ok(value) => {
                self.put(key, &Entry::Found { value: &value }, ttl).await?;
                tracing::debug!(key, "Cached computed value");
                Ok(value)
            }
            Err(EngineError::NotFound { what }) => {
                self.put(key, &Entry::<&T>::Missing { what: what.clone() }, ttl)
                    .await?;
                tracing::debug!(key, "Cached not-found outcome");
                Err(EngineError::NotFound { what })
            }
            Err(err) => Err(err),
        }
    }

    async fn put<T: Serialize>(&self, key: &str, entry: &Entry<T>, ttl: TtlClass) -> Result<()> {
        let raw = serde_json::to_string(entry).map_err(|e| EngineError::backend(Backend::Cache, e))?;
        self.store.set(key, raw, ttl.duration()).await
    }
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<Entry<T>> {
    serde_json::from_str(raw).map_err(|e| EngineError::backend(Backend::Cache, e))
}
