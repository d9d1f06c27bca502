//! Read-through, invalidate-on-write caching for a single entity type.
//!
//! The cache is an accelerator only. Every miss and every cache failure
//! falls back to the repository, and cache writes never affect the outcome
//! of the operation that triggered them.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use subkeeper_core::cache::{
    decode_lookup, serialize, Cache, CacheError, CacheLookup, CacheableEntity,
    Result as CacheResult,
};
use subkeeper_core::storage::Result;

/// Typed view over a shared byte cache for entities of type `T`.
///
/// # Type Parameters
///
/// * `T` - The cached entity; its namespace and identity keys come from
///   [`CacheableEntity`].
pub struct EntityCache<T> {
    cache: Arc<dyn Cache>,
    ttl: Duration,
    op_timeout: Duration,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityCache<T> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
            op_timeout: self.op_timeout,
            _entity: PhantomData,
        }
    }
}

impl<T: CacheableEntity> EntityCache<T> {
    /// Creates a new entity cache.
    ///
    /// # Arguments
    ///
    /// * `cache` - The shared cache backend
    /// * `ttl` - Time-to-live for every key written by this cache
    /// * `op_timeout` - Upper bound for a single backend call
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration, op_timeout: Duration) -> Self {
        Self {
            cache,
            ttl,
            op_timeout,
            _entity: PhantomData,
        }
    }

    /// Creates an entity cache using the entity's default TTL.
    #[cfg(test)]
    pub fn with_default_ttl(cache: Arc<dyn Cache>, op_timeout: Duration) -> Self {
        Self::new(cache, T::DEFAULT_TTL, op_timeout)
    }

    #[cfg(test)]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Runs a backend call under the per-operation deadline.
    async fn bounded<R>(&self, op: impl Future<Output = CacheResult<R>>) -> CacheResult<R> {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .unwrap_or_else(|_| Err(CacheError::Timeout(self.op_timeout)))
    }

    /// Looks up a single key.
    ///
    /// Unavailable lookups are logged here so callers can treat them exactly
    /// like a miss.
    pub async fn get_by_key(&self, key: &str) -> CacheLookup<T> {
        let lookup = decode_lookup(self.bounded(self.cache.get(key)).await);

        match &lookup {
            CacheLookup::Hit(_) => tracing::trace!(key = %key, "Cache hit"),
            CacheLookup::Miss => tracing::trace!(key = %key, "Cache miss"),
            CacheLookup::Unavailable(err) => {
                tracing::warn!(key = %key, error = %err, "Cache unavailable, using repository");
            }
        }

        lookup
    }

    /// Writes the entity under every key it is addressable by.
    ///
    /// Each key is written independently; a failure on one key does not
    /// stop the others.
    pub async fn set(&self, entity: &T) {
        let bytes = match serialize(entity) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(
                    namespace = T::NAMESPACE,
                    id = %entity.entity_id(),
                    error = %err,
                    "Failed to serialize entity for cache"
                );
                return;
            }
        };

        for key in entity.cache_keys() {
            if let Err(err) = self
                .bounded(self.cache.set(&key, &bytes, Some(self.ttl)))
                .await
            {
                tracing::warn!(key = %key, error = %err, "Failed to populate cache");
            }
        }
    }

    /// Removes a single key.
    pub async fn delete_by_key(&self, key: &str) {
        if let Err(err) = self.bounded(self.cache.delete(key)).await {
            tracing::warn!(key = %key, error = %err, "Failed to invalidate cache");
        }
    }

    /// Removes every key the entity is addressable by.
    pub async fn delete_all(&self, entity: &T) {
        for key in entity.cache_keys() {
            self.delete_by_key(&key).await;
        }
    }

    /// Read-through lookup.
    ///
    /// On a hit the repository is not consulted. On a miss or an unavailable
    /// cache, `load` is awaited; a found entity populates the cache, while an
    /// absent entity or a repository error leaves the cache untouched.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        if let CacheLookup::Hit(entity) = self.get_by_key(key).await {
            return Ok(Some(entity));
        }

        let loaded = load().await?;
        if let Some(entity) = &loaded {
            self.set(entity).await;
        }
        Ok(loaded)
    }
}
