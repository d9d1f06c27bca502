use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Byte-level key/value store that typed entity caches are layered on.
///
/// `set` replaces any prior value under the key and restarts its expiry, and
/// a read of an expired key is indistinguishable from a read of an absent
/// one. `Ok(None)` is a miss; `Err` means the backend could not answer.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// `None` stores without expiry.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
