use std::sync::Arc;

use uuid::Uuid;

use subkeeper_core::cache::CacheableEntity;
use subkeeper_core::domain::{CreateOrderRequest, Order, UpdateOrderRequest};
use subkeeper_core::pagination::{Page, PageRequest};
use subkeeper_core::storage::OrderRepository;

use super::error::{found, Result};
use crate::cache::EntityCache;

#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    cache: EntityCache<Order>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>, cache: EntityCache<Order>) -> Self {
        Self { repo, cache }
    }

    pub async fn get(&self, id: Uuid) -> Result<Order> {
        let order = self
            .cache
            .get_or_load(&Order::key_for_id(id), || self.repo.get_order(id))
            .await?;
        found(order, "Order", id)
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Order>> {
        let orders = self.repo.list_orders(&page).await?;
        Ok(Page::new(orders, page.limit))
    }

    pub async fn create(&self, request: CreateOrderRequest) -> Result<Order> {
        let order = request.into_order();

        self.repo.create_order(&order).await?;
        self.cache.set(&order).await;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            service_id = %order.service_id,
            "Order created"
        );
        Ok(order)
    }

    pub async fn update(&self, id: Uuid, request: UpdateOrderRequest) -> Result<Order> {
        let mut order = found(self.repo.get_order(id).await?, "Order", id)?;

        request.apply_to(&mut order);
        self.repo.update_order(&order).await?;
        self.cache.delete_by_key(&Order::key_for_id(id)).await;

        tracing::debug!(order_id = %id, is_paid = order.is_paid, "Order updated");
        Ok(order)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete_order(id).await?;
        self.cache.delete_by_key(&Order::key_for_id(id)).await;

        tracing::debug!(order_id = %id, "Order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subkeeper_core::cache::Cache;
    use subkeeper_core::storage::RepositoryError;

    use crate::cache::MemoryCache;
    use crate::services::ServiceError;
    use crate::storage::InMemoryRepository;
    use crate::testing::{entity_cache, seed, Fixture};

    async fn setup() -> (OrderService, Arc<MemoryCache>, Fixture) {
        let repo = Arc::new(InMemoryRepository::new());
        let fixture = seed(&repo).await;
        let backend = Arc::new(MemoryCache::new(100));
        (OrderService::new(repo, entity_cache(backend.clone())), backend, fixture)
    }

    #[tokio::test]
    async fn test_order_lifecycle() {
        let (orders, backend, fixture) = setup().await;

        let order = orders
            .create(CreateOrderRequest {
                user_id: fixture.user.id,
                service_id: fixture.service.id,
                is_paid: false,
            })
            .await
            .unwrap();
        assert!(!orders.get(order.id).await.unwrap().is_paid);

        let paid = orders
            .update(order.id, UpdateOrderRequest { is_paid: Some(true) })
            .await
            .unwrap();
        assert!(paid.is_paid);
        assert!(backend.get(&Order::key_for_id(order.id)).await.unwrap().is_none());
        assert!(orders.get(order.id).await.unwrap().is_paid);

        orders.delete(order.id).await.unwrap();
        assert!(matches!(
            orders.get(order.id).await,
            Err(ServiceError::Repository(RepositoryError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_order_for_unknown_user_is_rejected() {
        let (orders, _, fixture) = setup().await;

        let result = orders
            .create(CreateOrderRequest {
                user_id: Uuid::new_v4(),
                service_id: fixture.service.id,
                is_paid: false,
            })
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Repository(RepositoryError::InvalidData(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let (orders, _, _) = setup().await;

        let result = orders
            .update(Uuid::new_v4(), UpdateOrderRequest::default())
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Repository(RepositoryError::NotFound { .. }))
        ));
    }
}
