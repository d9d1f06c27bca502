//! Redis cache implementation.
//!
//! Entities are stored as their JSON bytes under the `<entity>:<field>:<value>`
//! keys. Expiry is delegated to Redis via `SET ... EX`, so an expired key
//! reads back as nil like any other miss.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tokio::sync::OnceCell;

use subkeeper_core::cache::{Cache, CacheError, Result};

use super::error::map_redis_error;

/// `EX` takes whole seconds and rejects zero, so sub-second TTLs round up.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Cache backed by a shared Redis server.
///
/// The connection is opened on first use. Until a connect succeeds, every
/// call retries it and fails with `ConnectionFailed`, which callers treat as
/// an unavailable cache. A connect attempt is abandoned after
/// `connect_timeout`. Once open, the [`ConnectionManager`] reconnects on its
/// own.
pub struct RedisCache {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    connect_timeout: Duration,
}

impl RedisCache {
    /// Parses `url`, e.g. `redis://localhost:6379`, without connecting.
    ///
    /// Only a malformed URL is an error here.
    pub fn new(url: &str, connect_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            connect_timeout,
        })
    }

    /// Opens the connection if it is not open yet.
    pub async fn connect(&self) -> Result<()> {
        self.connection().await.map(|_| ())
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let attempt = ConnectionManager::new(self.client.clone());
                let conn = tokio::time::timeout(self.connect_timeout, attempt)
                    .await
                    .map_err(|_| {
                        CacheError::ConnectionFailed(format!(
                            "no connection within {:?}",
                            self.connect_timeout
                        ))
                    })?
                    .map_err(map_redis_error)?;
                tracing::debug!("Connected to Redis");
                Ok::<_, CacheError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.connection()
            .await?
            .get(key)
            .await
            .map_err(map_redis_error)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.connection().await?;
        let written = match ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, expiry_secs(ttl)).await,
            None => conn.set::<_, _, ()>(key, value).await,
        };
        written.map_err(map_redis_error)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.connection()
            .await?
            .del::<_, ()>(key)
            .await
            .map_err(map_redis_error)
    }
}
