//! Shared test doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use subkeeper_core::cache::{Cache, CacheError, CacheableEntity, Result as CacheResult};
use subkeeper_core::domain::{Category, Order, Service, Subscription, User};
use subkeeper_core::storage::{
    CategoryRepository, OrderRepository, ServiceRepository, SubscriptionRepository,
    UserRepository,
};

use crate::cache::EntityCache;
use crate::storage::InMemoryRepository;

pub const OP_TIMEOUT: Duration = Duration::from_millis(200);

/// Entity cache over `cache` with the entity's default TTL.
pub fn entity_cache<T: CacheableEntity>(cache: Arc<dyn Cache>) -> EntityCache<T> {
    EntityCache::with_default_ttl(cache, OP_TIMEOUT)
}

/// Cache whose every call fails as if the server were unreachable.
#[derive(Default)]
pub struct FailingCache {
    calls: AtomicUsize,
}

impl FailingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> CacheResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::ConnectionFailed("connection refused".to_string()))
    }
}

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.fail()
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        self.fail()
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        self.fail()
    }
}

/// Rows every order, payment and subscription test needs.
pub struct Fixture {
    pub user: User,
    pub service: Service,
}

/// Seeds a user and a "Netflix" service in its own category.
pub async fn seed(repo: &InMemoryRepository) -> Fixture {
    let user = User::new("ada@example.com", "Ada", "Lovelace");
    let category = Category::new("Streaming");
    let service = Service::new("Netflix", category.id);

    repo.create_user(&user).await.unwrap();
    repo.create_category(&category).await.unwrap();
    repo.create_service(&service).await.unwrap();

    Fixture { user, service }
}

impl Fixture {
    /// Stores a subscription starting on the first of `month` 2024.
    pub async fn subscribe(
        &self,
        repo: &InMemoryRepository,
        month: u32,
        price: i64,
    ) -> Subscription {
        let start = Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap();
        let subscription = Subscription::new(self.user.id, self.service.id, start, price);
        repo.create_subscription(&subscription).await.unwrap();
        subscription
    }

    pub async fn order(&self, repo: &InMemoryRepository) -> Order {
        let order = Order::new(self.user.id, self.service.id);
        repo.create_order(&order).await.unwrap();
        order
    }
}
