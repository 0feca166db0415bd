use super::CacheStore;
use crate::error::Result;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct Slot {
    value: String,
    expires_at: Instant,
}

/// In-process cache bounded by entry count; least recently used entries
/// are evicted first and expired entries are dropped on read.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, Slot>>,
}

impl MemoryCacheStore {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl std::fmt::Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(slot) if slot.expires_at > Instant::now() => return Ok(Some(slot.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let slot = Slot {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().await.put(key.to_string(), slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = MemoryCacheStore::new(4);
        store.set("a", "1".into(), Duration::from_secs(10)).await.unwrap();

        let fresh = store.get("a").await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        let expired = store.get("a").await.unwrap();

        check!(fresh.as_deref() == Some("1"));
        check!(expired.is_none());
        check!(store.len().await == 0);
    }

    #[tokio::test]
    async fn test_least_recently_used_is_evicted() {
        let store = MemoryCacheStore::new(2);
        let ttl = Duration::from_secs(60);
        store.set("a", "1".into(), ttl).await.unwrap();
        store.set("b", "2".into(), ttl).await.unwrap();
        store.get("a").await.unwrap();
        store.set("c", "3".into(), ttl).await.unwrap();

        let evicted = store.get("b").await.unwrap();
        let kept = store.get("a").await.unwrap();
        check!(evicted.is_none());
        check!(kept.as_deref() == Some("1"));
    }
}
