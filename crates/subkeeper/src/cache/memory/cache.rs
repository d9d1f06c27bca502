//! Process-local cache bounded by entry count.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use subkeeper_core::cache::{Cache, Result};

#[derive(Debug)]
struct Slot {
    bytes: Vec<u8>,
    deadline: Option<Instant>,
}

impl Slot {
    fn live_at(&self, now: Instant) -> bool {
        self.deadline.is_none_or(|deadline| now < deadline)
    }
}

/// LRU map of serialized entities with per-entry deadlines.
///
/// Every operation touches recency, so a single [`Mutex`] guards the map.
/// An expired slot is removed by the read that finds it, which then reports
/// a miss. Once `max_entries` slots are held, inserting a new key evicts the
/// least recently used one.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    slots: Arc<Mutex<LruCache<String, Slot>>>,
}

impl MemoryCache {
    /// A `max_entries` of 0 still holds one entry.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut slots = self.slots.lock().await;
        let live = slots.get(key).map(|slot| slot.live_at(Instant::now()));

        Ok(match live {
            Some(true) => slots.peek(key).map(|slot| slot.bytes.clone()),
            Some(false) => {
                slots.pop(key);
                None
            }
            None => None,
        })
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let slot = Slot {
            bytes: value.to_vec(),
            deadline: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.slots.lock().await.put(key.to_owned(), slot);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.slots.lock().await.pop(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Option<Duration> = Some(Duration::from_secs(60));

    #[tokio::test]
    async fn test_miss_then_hit_then_delete() {
        let cache = MemoryCache::new(16);
        let key = "category:id:streaming";

        assert_eq!(cache.get(key).await.unwrap(), None);

        cache.set(key, b"{\"name\":\"Streaming\"}", MINUTE).await.unwrap();
        assert_eq!(
            cache.get(key).await.unwrap().as_deref(),
            Some(&b"{\"name\":\"Streaming\"}"[..])
        );

        cache.delete(key).await.unwrap();
        assert_eq!(cache.get(key).await.unwrap(), None);
        // Deleting again is not an error.
        cache.delete(key).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_entry_is_dropped_on_read() {
        let cache = MemoryCache::new(16);
        let key = "payment:id:1";

        cache
            .set(key, b"short-lived", Some(Duration::from_millis(40)))
            .await
            .unwrap();
        assert!(cache.get(key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.get(key).await.unwrap(), None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value_and_deadline() {
        let cache = MemoryCache::new(16);
        let key = "user:email:ann@example.com";

        cache
            .set(key, b"old", Some(Duration::from_millis(40)))
            .await
            .unwrap();
        cache.set(key, b"new", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.get(key).await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_reads_refresh_recency_before_eviction() {
        let cache = MemoryCache::new(2);

        cache.set("order:id:a", b"a", MINUTE).await.unwrap();
        cache.set("order:id:b", b"b", MINUTE).await.unwrap();
        cache.get("order:id:a").await.unwrap();
        cache.set("order:id:c", b"c", MINUTE).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("order:id:a").await.unwrap().is_some());
        assert!(cache.get("order:id:b").await.unwrap().is_none());
        assert!(cache.get("order:id:c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_capacity_keeps_latest_entry() {
        let cache = MemoryCache::new(0);

        cache.set("service:id:1", b"1", None).await.unwrap();
        cache.set("service:id:2", b"2", None).await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.get("service:id:2").await.unwrap().is_some());
    }
}
