use std::sync::Arc;

use uuid::Uuid;

use subkeeper_core::billing::{calculate_total, BillingFilter, BillingTotal};
use subkeeper_core::cache::CacheableEntity;
use subkeeper_core::domain::{
    CreateSubscriptionRequest, Subscription, SubscriptionView, UpdateSubscriptionRequest,
};
use subkeeper_core::pagination::{Page, PageRequest};
use subkeeper_core::storage::SubscriptionRepository;

use super::error::{found, Result};
use super::CatalogService;
use crate::cache::EntityCache;

/// Subscriptions and the billing total computed over them.
///
/// Only the stored row is cached. The service name in a [`SubscriptionView`]
/// is looked up through the [`CatalogService`] on every read, so renaming a
/// service never leaves a stale name behind a subscription key.
#[derive(Clone)]
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
    cache: EntityCache<Subscription>,
    catalog: CatalogService,
}

impl SubscriptionService {
    pub fn new(
        repo: Arc<dyn SubscriptionRepository>,
        cache: EntityCache<Subscription>,
        catalog: CatalogService,
    ) -> Self {
        Self {
            repo,
            cache,
            catalog,
        }
    }

    async fn view(&self, subscription: &Subscription) -> Result<SubscriptionView> {
        let service = self.catalog.get(subscription.service_id).await?;
        Ok(SubscriptionView::new(subscription, service.name))
    }

    pub async fn get(&self, id: Uuid) -> Result<SubscriptionView> {
        let subscription = self
            .cache
            .get_or_load(&Subscription::key_for_id(id), || {
                self.repo.get_subscription(id)
            })
            .await?;
        self.view(&found(subscription, "Subscription", id)?).await
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<SubscriptionView>> {
        let views = self.repo.list_subscriptions(&page).await?;
        Ok(Page::new(views, page.limit))
    }

    pub async fn create(&self, request: CreateSubscriptionRequest) -> Result<SubscriptionView> {
        request.validate()?;
        let subscription = request.into_subscription();

        self.repo.create_subscription(&subscription).await?;
        self.cache.set(&subscription).await;
        let view = self.view(&subscription).await?;

        tracing::info!(
            subscription_id = %view.id,
            user_id = %view.user_id,
            service = %view.service_name,
            price = view.price,
            "Subscription created"
        );
        Ok(view)
    }

    /// Applies a partial update; the merged period must still be valid.
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateSubscriptionRequest,
    ) -> Result<SubscriptionView> {
        request.validate()?;
        let mut subscription = found(self.repo.get_subscription(id).await?, "Subscription", id)?;

        request.apply_to(&mut subscription)?;
        self.repo.update_subscription(&subscription).await?;
        self.cache.delete_by_key(&Subscription::key_for_id(id)).await;

        tracing::debug!(subscription_id = %id, "Subscription updated");
        self.view(&subscription).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete_subscription(id).await?;
        self.cache.delete_by_key(&Subscription::key_for_id(id)).await;

        tracing::debug!(subscription_id = %id, "Subscription deleted");
        Ok(())
    }

    /// Sum of what the filtered subscriptions bill inside the window.
    ///
    /// Totals are always computed from the repository. A sum that does not
    /// fit in `i64` is a validation error.
    pub async fn total(&self, filter: BillingFilter) -> Result<BillingTotal> {
        let rows = self.repo.find_for_total(&filter).await?;
        let total_price = calculate_total(&rows, &filter.window)?;

        tracing::debug!(
            rows = rows.len(),
            user_id = ?filter.user_id,
            service_name = ?filter.service_name,
            total_price,
            "Computed subscription total"
        );
        Ok(BillingTotal { total_price })
    }
}
