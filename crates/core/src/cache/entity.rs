//! Identity and lookup types for per-entity caching.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::domain::{Category, Order, Payment, Service, Subscription, User};

use super::keys::{id_key, user_email_key};
use super::serialization::deserialize;
use super::{CacheError, Result};

const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);
const TEN_MINUTES: Duration = Duration::from_secs(10 * 60);

/// An entity that can be cached under one or more identity keys.
pub trait CacheableEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key namespace, e.g. `"user"`.
    const NAMESPACE: &'static str;

    /// TTL used when no override is configured.
    const DEFAULT_TTL: Duration;

    /// Primary identity of the entity.
    fn entity_id(&self) -> Uuid;

    /// Cache key for a primary identity.
    fn key_for_id(id: Uuid) -> String {
        id_key(Self::NAMESPACE, id)
    }

    /// Every key this entity is addressable by.
    fn cache_keys(&self) -> Vec<String> {
        vec![Self::key_for_id(self.entity_id())]
    }
}

impl CacheableEntity for User {
    const NAMESPACE: &'static str = "user";
    const DEFAULT_TTL: Duration = FIVE_MINUTES;

    fn entity_id(&self) -> Uuid {
        self.id
    }

    fn cache_keys(&self) -> Vec<String> {
        vec![Self::key_for_id(self.id), user_email_key(&self.email)]
    }
}

impl CacheableEntity for Category {
    const NAMESPACE: &'static str = "category";
    const DEFAULT_TTL: Duration = FIVE_MINUTES;

    fn entity_id(&self) -> Uuid {
        self.id
    }
}

impl CacheableEntity for Service {
    const NAMESPACE: &'static str = "service";
    const DEFAULT_TTL: Duration = FIVE_MINUTES;

    fn entity_id(&self) -> Uuid {
        self.id
    }
}

impl CacheableEntity for Order {
    const NAMESPACE: &'static str = "order";
    const DEFAULT_TTL: Duration = FIVE_MINUTES;

    fn entity_id(&self) -> Uuid {
        self.id
    }
}

impl CacheableEntity for Payment {
    const NAMESPACE: &'static str = "payment";
    const DEFAULT_TTL: Duration = TEN_MINUTES;

    fn entity_id(&self) -> Uuid {
        self.id
    }
}

/// Cached as the stored row, without the joined service name.
impl CacheableEntity for Subscription {
    const NAMESPACE: &'static str = "subscription";
    const DEFAULT_TTL: Duration = TEN_MINUTES;

    fn entity_id(&self) -> Uuid {
        self.id
    }
}

/// Outcome of a cache read.
///
/// `Miss` and `Unavailable` call for the same fallback to the repository;
/// they are kept apart so the failure can be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    Unavailable(CacheError),
}

impl<T> CacheLookup<T> {
    /// Returns the cached value on a hit.
    pub fn hit(self) -> Option<T> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            CacheLookup::Miss | CacheLookup::Unavailable(_) => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

/// Turns the raw result of `Cache::get` into a typed lookup.
///
/// Bytes that do not decode into `T` are reported as `Unavailable`.
pub fn decode_lookup<T: DeserializeOwned>(result: Result<Option<Vec<u8>>>) -> CacheLookup<T> {
    match result {
        Ok(Some(bytes)) => match deserialize(&bytes) {
            Ok(value) => CacheLookup::Hit(value),
            Err(err) => CacheLookup::Unavailable(CacheError::Serialization(err.to_string())),
        },
        Ok(None) => CacheLookup::Miss,
        Err(err) => CacheLookup::Unavailable(err),
    }
}
