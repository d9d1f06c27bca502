//! Application state shared by every request handler.
//!
//! The storage and cache backends are chosen at compile time by feature
//! flags; the state itself only holds the services built on top of them.

use std::sync::Arc;

use subkeeper_core::cache::Cache;
use subkeeper_core::pagination::LimitPolicy;
use subkeeper_core::storage::{
    CategoryRepository, OrderRepository, PaymentRepository, ServiceRepository,
    SubscriptionRepository, UserRepository,
};

#[cfg(feature = "redis")]
use crate::cache::RedisCache;
#[cfg(feature = "sqlite")]
use crate::storage::SqliteRepository;
#[cfg(any(feature = "memory", test))]
use crate::cache::MemoryCache;
#[cfg(any(feature = "inmemory", test))]
use crate::storage::InMemoryRepository;

use crate::cache::EntityCache;
use crate::config::Config;
use crate::services::{
    CatalogService, CategoryService, OrderService, PaymentService, SubscriptionService,
    UserService,
};

/// A storage backend that serves every entity.
pub trait Storage:
    UserRepository
    + CategoryRepository
    + ServiceRepository
    + OrderRepository
    + PaymentRepository
    + SubscriptionRepository
    + 'static
{
}

impl<T> Storage for T where
    T: UserRepository
        + CategoryRepository
        + ServiceRepository
        + OrderRepository
        + PaymentRepository
        + SubscriptionRepository
        + 'static
{
}

/// Shared application state.
///
/// Cloned for each request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub categories: CategoryService,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub payments: PaymentService,
    pub subscriptions: SubscriptionService,
    /// Page size bounds applied to every list request.
    pub limits: LimitPolicy,
}

impl AppState {
    /// Wires the services over one storage backend and one shared cache.
    pub fn build<S: Storage>(storage: Arc<S>, cache: Arc<dyn Cache>, config: &Config) -> Self {
        let ttls = &config.cache_ttls;
        let timeout = config.cache_timeout;
        let catalog = CatalogService::new(
            storage.clone(),
            EntityCache::new(cache.clone(), ttls.service, timeout),
        );

        Self {
            users: UserService::new(
                storage.clone(),
                EntityCache::new(cache.clone(), ttls.user, timeout),
            ),
            categories: CategoryService::new(
                storage.clone(),
                EntityCache::new(cache.clone(), ttls.category, timeout),
            ),
            orders: OrderService::new(
                storage.clone(),
                EntityCache::new(cache.clone(), ttls.order, timeout),
            ),
            payments: PaymentService::new(
                storage.clone(),
                EntityCache::new(cache.clone(), ttls.payment, timeout),
            ),
            subscriptions: SubscriptionService::new(
                storage,
                EntityCache::new(cache, ttls.subscription, timeout),
                catalog.clone(),
            ),
            catalog,
            limits: config.page_limits,
        }
    }

    /// Creates AppState with the backends selected by feature flags.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let storage = open_storage(config).await?;
        let cache = open_cache(config).await?;
        Ok(Self::build(storage, cache, config))
    }
}

#[cfg(feature = "inmemory")]
async fn open_storage(_config: &Config) -> anyhow::Result<Arc<InMemoryRepository>> {
    tracing::info!("Using in-memory storage");
    Ok(Arc::new(InMemoryRepository::new()))
}

#[cfg(feature = "sqlite")]
async fn open_storage(config: &Config) -> anyhow::Result<Arc<SqliteRepository>> {
    tracing::info!(path = %config.sqlite_path, "Using SQLite storage");
    Ok(Arc::new(SqliteRepository::new(&config.sqlite_path).await?))
}

#[cfg(feature = "memory")]
async fn open_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    tracing::info!(max_entries = config.cache_max_entries, "Using in-memory cache");
    Ok(Arc::new(MemoryCache::new(config.cache_max_entries)))
}

/// An unreachable server is only logged; requests fall back to storage and
/// the connect is retried on the next cache call.
#[cfg(feature = "redis")]
async fn open_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    tracing::info!(url = %config.redis_url, "Using Redis cache");
    let cache = RedisCache::new(&config.redis_url, config.cache_timeout)?;
    if let Err(err) = cache.connect().await {
        tracing::warn!(error = %err, "Redis unavailable at startup, continuing without cache");
    }
    Ok(Arc::new(cache))
}

#[cfg(test)]
impl AppState {
    /// In-memory storage and cache, for router tests.
    pub fn for_tests() -> Self {
        use std::time::Duration;

        use crate::config::CacheTtls;

        let config = Config {
            cache_max_entries: 1_000,
            cache_timeout: crate::testing::OP_TIMEOUT,
            cache_ttls: CacheTtls {
                user: Duration::from_secs(300),
                category: Duration::from_secs(300),
                service: Duration::from_secs(300),
                order: Duration::from_secs(300),
                payment: Duration::from_secs(600),
                subscription: Duration::from_secs(600),
            },
            page_limits: LimitPolicy::default(),
            request_timeout: Duration::from_secs(10),
            sqlite_path: ":memory:".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
        };

        Self::build(
            Arc::new(InMemoryRepository::new()),
            Arc::new(MemoryCache::new(config.cache_max_entries)),
            &config,
        )
    }
}
