//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use subkeeper_core::billing::{BillingFilter, SubscriptionRow};
use subkeeper_core::domain::{
    Category, Order, Payment, Service, Subscription, SubscriptionView, User,
};
use subkeeper_core::pagination::{paginate, PageRequest};
use subkeeper_core::storage::{
    CategoryRepository, OrderRepository, PaymentRepository, RepositoryError, Result,
    ServiceRepository, SubscriptionRepository, UserRepository,
};

type Table<T> = Arc<RwLock<HashMap<Uuid, T>>>;

/// In-memory storage backend for testing.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    users: Table<User>,
    categories: Table<Category>,
    services: Table<Service>,
    orders: Table<Order>,
    payments: Table<Payment>,
    subscriptions: Table<Subscription>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `InvalidData` when `id` is missing from `table`.
    async fn require<T>(table: &Table<T>, entity_type: &'static str, id: Uuid) -> Result<()> {
        if table.read().await.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidData(format!(
                "Foreign key constraint violation for {entity_type}: {id}"
            )))
        }
    }

    /// Fails with `InvalidData` when any row of `table` still references `id`.
    async fn restrict<T>(
        table: &Table<T>,
        entity_type: &'static str,
        references: impl Fn(&T) -> bool,
    ) -> Result<()> {
        if table.read().await.values().any(references) {
            Err(RepositoryError::InvalidData(format!(
                "Foreign key constraint violation: {entity_type} still referenced"
            )))
        } else {
            Ok(())
        }
    }
}

fn insert_new<T: Clone>(
    table: &mut HashMap<Uuid, T>,
    entity_type: &'static str,
    id: Uuid,
    value: &T,
) -> Result<()> {
    if table.contains_key(&id) {
        return Err(RepositoryError::AlreadyExists {
            entity_type,
            id: id.to_string(),
        });
    }
    table.insert(id, value.clone());
    Ok(())
}

fn replace_existing<T: Clone>(
    table: &mut HashMap<Uuid, T>,
    entity_type: &'static str,
    id: Uuid,
    value: &T,
) -> Result<()> {
    match table.get_mut(&id) {
        Some(existing) => {
            *existing = value.clone();
            Ok(())
        }
        None => Err(RepositoryError::NotFound {
            entity_type,
            id: id.to_string(),
        }),
    }
}

fn remove_existing<T>(
    table: &mut HashMap<Uuid, T>,
    entity_type: &'static str,
    id: Uuid,
) -> Result<()> {
    if table.remove(&id).is_none() {
        return Err(RepositoryError::NotFound {
            entity_type,
            id: id.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, page: &PageRequest) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(paginate(users.values().cloned(), page))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.email.clone(),
            });
        }
        insert_new(&mut users, "User", user.id, user)
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.email.clone(),
            });
        }
        replace_existing(&mut users, "User", user.id, user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        Self::restrict(&self.orders, "User", |o| o.user_id == id).await?;
        Self::restrict(&self.subscriptions, "User", |s| s.user_id == id).await?;
        let mut users = self.users.write().await;
        remove_existing(&mut users, "User", id)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryRepository {
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.get(&id).cloned())
    }

    async fn list_categories(&self, page: &PageRequest) -> Result<Vec<Category>> {
        let categories = self.categories.read().await;
        Ok(paginate(categories.values().cloned(), page))
    }

    async fn create_category(&self, category: &Category) -> Result<()> {
        let mut categories = self.categories.write().await;
        insert_new(&mut categories, "Category", category.id, category)
    }

    async fn update_category(&self, category: &Category) -> Result<()> {
        let mut categories = self.categories.write().await;
        replace_existing(&mut categories, "Category", category.id, category)
    }

    async fn delete_category(&self, id: Uuid) -> Result<()> {
        Self::restrict(&self.services, "Category", |s| s.category_id == id).await?;
        let mut categories = self.categories.write().await;
        remove_existing(&mut categories, "Category", id)
    }
}

#[async_trait]
impl ServiceRepository for InMemoryRepository {
    async fn get_service(&self, id: Uuid) -> Result<Option<Service>> {
        let services = self.services.read().await;
        Ok(services.get(&id).cloned())
    }

    async fn list_services(&self, page: &PageRequest) -> Result<Vec<Service>> {
        let services = self.services.read().await;
        Ok(paginate(services.values().cloned(), page))
    }

    async fn create_service(&self, service: &Service) -> Result<()> {
        Self::require(&self.categories, "Service", service.category_id).await?;
        let mut services = self.services.write().await;
        insert_new(&mut services, "Service", service.id, service)
    }

    async fn update_service(&self, service: &Service) -> Result<()> {
        Self::require(&self.categories, "Service", service.category_id).await?;
        let mut services = self.services.write().await;
        replace_existing(&mut services, "Service", service.id, service)
    }

    async fn delete_service(&self, id: Uuid) -> Result<()> {
        Self::restrict(&self.orders, "Service", |o| o.service_id == id).await?;
        Self::restrict(&self.subscriptions, "Service", |s| s.service_id == id).await?;
        let mut services = self.services.write().await;
        remove_existing(&mut services, "Service", id)
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepository {
    async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn list_orders(&self, page: &PageRequest) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(paginate(orders.values().cloned(), page))
    }

    async fn create_order(&self, order: &Order) -> Result<()> {
        Self::require(&self.users, "Order", order.user_id).await?;
        Self::require(&self.services, "Order", order.service_id).await?;
        let mut orders = self.orders.write().await;
        insert_new(&mut orders, "Order", order.id, order)
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        replace_existing(&mut orders, "Order", order.id, order)
    }

    async fn delete_order(&self, id: Uuid) -> Result<()> {
        Self::restrict(&self.payments, "Order", |p| p.order_id == id).await?;
        let mut orders = self.orders.write().await;
        remove_existing(&mut orders, "Order", id)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryRepository {
    async fn get_payment(&self, id: Uuid) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id).cloned())
    }

    async fn list_payments(&self, page: &PageRequest) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(paginate(payments.values().cloned(), page))
    }

    async fn create_payment(&self, payment: &Payment) -> Result<()> {
        Self::require(&self.subscriptions, "Payment", payment.subscription_id).await?;
        Self::require(&self.orders, "Payment", payment.order_id).await?;
        let mut payments = self.payments.write().await;
        insert_new(&mut payments, "Payment", payment.id, payment)
    }

    async fn update_payment(&self, payment: &Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        replace_existing(&mut payments, "Payment", payment.id, payment)
    }

    async fn delete_payment(&self, id: Uuid) -> Result<()> {
        let mut payments = self.payments.write().await;
        remove_existing(&mut payments, "Payment", id)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryRepository {
    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.get(&id).cloned())
    }

    async fn list_subscriptions(&self, page: &PageRequest) -> Result<Vec<SubscriptionView>> {
        let subscriptions = self.subscriptions.read().await;
        let services = self.services.read().await;

        // Inner join: subscriptions without a service are not listed.
        let views = subscriptions.values().filter_map(|sub| {
            services
                .get(&sub.service_id)
                .map(|service| SubscriptionView::new(sub, &service.name))
        });

        Ok(paginate(views, page))
    }

    async fn create_subscription(&self, subscription: &Subscription) -> Result<()> {
        Self::require(&self.users, "Subscription", subscription.user_id).await?;
        Self::require(&self.services, "Subscription", subscription.service_id).await?;
        let mut subscriptions = self.subscriptions.write().await;
        insert_new(&mut subscriptions, "Subscription", subscription.id, subscription)
    }

    async fn update_subscription(&self, subscription: &Subscription) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        replace_existing(&mut subscriptions, "Subscription", subscription.id, subscription)
    }

    async fn delete_subscription(&self, id: Uuid) -> Result<()> {
        Self::restrict(&self.payments, "Subscription", |p| p.subscription_id == id).await?;
        let mut subscriptions = self.subscriptions.write().await;
        remove_existing(&mut subscriptions, "Subscription", id)
    }

    async fn find_for_total(&self, filter: &BillingFilter) -> Result<Vec<SubscriptionRow>> {
        let subscriptions = self.subscriptions.read().await;
        let services = self.services.read().await;

        Ok(subscriptions
            .values()
            .filter_map(|sub| services.get(&sub.service_id).map(|s| (sub, &s.name)))
            .filter(|(sub, name)| filter.admits(sub, name))
            .map(|(sub, name)| SubscriptionRow::new(sub, name.as_str()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use subkeeper_core::billing::BillingWindow;
    use subkeeper_core::domain::PaymentStatus;
    use subkeeper_core::pagination::{Cursor, Page};

    fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    /// A repository seeded with one user, one category and one service.
    async fn seeded() -> (InMemoryRepository, User, Service) {
        let repo = InMemoryRepository::new();
        let user = User::new("alice@example.com", "Alice", "Smith");
        let category = Category::new("Streaming");
        let service = Service::new("Netflix", category.id);

        repo.create_user(&user).await.unwrap();
        repo.create_category(&category).await.unwrap();
        repo.create_service(&service).await.unwrap();

        (repo, user, service)
    }

    fn payment_for(subscription_id: Uuid, order_id: Uuid) -> Payment {
        let now = Utc::now();
        Payment {
            id: Uuid::new_v4(),
            subscription_id,
            order_id,
            amount: 999,
            currency: "USD".to_string(),
            paid_at: now,
            payment_status: PaymentStatus::Success,
            provider: "stripe".to_string(),
            created_at: now,
        }
    }

    // ==================== User Tests ====================

    #[tokio::test]
    async fn test_user_create_and_get() {
        let repo = InMemoryRepository::new();
        let user = User::new("alice@example.com", "Alice", "Smith");

        repo.create_user(&user).await.unwrap();

        let retrieved = repo.get_user(user.id).await.unwrap();
        assert_eq!(retrieved, Some(user));
    }

    #[tokio::test]
    async fn test_user_get_nonexistent() {
        let repo = InMemoryRepository::new();
        let result = repo.get_user(Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_user_get_by_email() {
        let (repo, user, _) = seeded().await;

        let retrieved = repo.get_user_by_email("alice@example.com").await.unwrap();
        assert_eq!(retrieved, Some(user));

        let missing = repo.get_user_by_email("bob@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_user_duplicate_email_rejected() {
        let (repo, _, _) = seeded().await;
        let twin = User::new("alice@example.com", "Alice", "Jones");

        let result = repo.create_user(&twin).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_user_update_to_taken_email_rejected() {
        let (repo, _, _) = seeded().await;
        let mut bob = User::new("bob@example.com", "Bob", "Stone");
        repo.create_user(&bob).await.unwrap();

        bob.email = "alice@example.com".to_string();
        let result = repo.update_user(&bob).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_user_update_nonexistent() {
        let repo = InMemoryRepository::new();
        let user = User::new("ghost@example.com", "Ghost", "User");

        let result = repo.update_user(&user).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_user_delete_nonexistent() {
        let repo = InMemoryRepository::new();
        let result = repo.delete_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_user_delete_restricted_by_subscription() {
        let (repo, user, service) = seeded().await;
        let sub = Subscription::new(user.id, service.id, date(2024, 1, 1), 100);
        repo.create_subscription(&sub).await.unwrap();

        let result = repo.delete_user(user.id).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));

        repo.delete_subscription(sub.id).await.unwrap();
        repo.delete_user(user.id).await.unwrap();
        assert!(repo.get_user(user.id).await.unwrap().is_none());
    }

    // ==================== Category / Service Tests ====================

    #[tokio::test]
    async fn test_category_update() {
        let repo = InMemoryRepository::new();
        let mut category = Category::new("Streaming");
        repo.create_category(&category).await.unwrap();

        category.name = "Video".to_string();
        repo.update_category(&category).await.unwrap();

        let retrieved = repo.get_category(category.id).await.unwrap().unwrap();
        assert_eq!(retrieved.name, "Video");
    }

    #[tokio::test]
    async fn test_category_create_duplicate_id() {
        let repo = InMemoryRepository::new();
        let category = Category::new("Streaming");
        repo.create_category(&category).await.unwrap();

        let result = repo.create_category(&category).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_service_requires_existing_category() {
        let repo = InMemoryRepository::new();
        let service = Service::new("Netflix", Uuid::new_v4());

        let result = repo.create_service(&service).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_category_delete_restricted_by_service() {
        let (repo, _, service) = seeded().await;

        let result = repo.delete_category(service.category_id).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    // ==================== Order / Payment Tests ====================

    #[tokio::test]
    async fn test_order_lifecycle() {
        let (repo, user, service) = seeded().await;
        let mut order = Order::new(user.id, service.id);

        repo.create_order(&order).await.unwrap();

        order.is_paid = true;
        repo.update_order(&order).await.unwrap();
        assert!(repo.get_order(order.id).await.unwrap().unwrap().is_paid);

        repo.delete_order(order.id).await.unwrap();
        assert!(repo.get_order(order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_payment_requires_subscription_and_order() {
        let (repo, user, service) = seeded().await;
        let order = Order::new(user.id, service.id);
        repo.create_order(&order).await.unwrap();

        let orphan = payment_for(Uuid::new_v4(), order.id);
        let result = repo.create_payment(&orphan).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));

        let sub = Subscription::new(user.id, service.id, date(2024, 1, 1), 999);
        repo.create_subscription(&sub).await.unwrap();

        let payment = payment_for(sub.id, order.id);
        repo.create_payment(&payment).await.unwrap();
        assert_eq!(repo.get_payment(payment.id).await.unwrap(), Some(payment));
    }

    // ==================== Subscription Tests ====================

    #[tokio::test]
    async fn test_subscription_view_joins_service_name() {
        let (repo, user, service) = seeded().await;
        let sub = Subscription::new(user.id, service.id, date(2024, 1, 15), 100);
        repo.create_subscription(&sub).await.unwrap();

        let views = repo.list_subscriptions(&PageRequest::first(10)).await.unwrap();

        assert_eq!(views, vec![SubscriptionView::new(&sub, "Netflix")]);
        assert_eq!(repo.get_subscription(sub.id).await.unwrap(), Some(sub));
    }

    #[tokio::test]
    async fn test_subscription_update_nonexistent() {
        let repo = InMemoryRepository::new();
        let sub = Subscription::new(Uuid::new_v4(), Uuid::new_v4(), date(2024, 1, 1), 100);

        let result = repo.update_subscription(&sub).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_for_total_applies_filter() {
        let (repo, user, netflix) = seeded().await;
        let other_user = User::new("bob@example.com", "Bob", "Stone");
        repo.create_user(&other_user).await.unwrap();
        let spotify = Service::new("Spotify", netflix.category_id);
        repo.create_service(&spotify).await.unwrap();

        let subs = [
            Subscription::new(user.id, netflix.id, date(2024, 1, 15), 100),
            Subscription::new(user.id, spotify.id, date(2024, 2, 1), 50),
            Subscription::new(other_user.id, netflix.id, date(2024, 1, 1), 70),
            Subscription::new(user.id, netflix.id, date(2023, 1, 1), 10)
                .with_end_date(date(2023, 6, 1)),
        ];
        for sub in &subs {
            repo.create_subscription(sub).await.unwrap();
        }

        let window = BillingWindow::new(date(2024, 1, 1), date(2024, 3, 1)).unwrap();

        let all = repo.find_for_total(&BillingFilter::new(window)).await.unwrap();
        assert_eq!(all.len(), 3);

        let mine = repo
            .find_for_total(&BillingFilter::new(window).with_user(user.id))
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);

        let mine_on_netflix = repo
            .find_for_total(
                &BillingFilter::new(window)
                    .with_user(user.id)
                    .with_service_name("Netflix"),
            )
            .await
            .unwrap();
        assert_eq!(mine_on_netflix.len(), 1);
        assert_eq!(mine_on_netflix[0].price, 100);
    }

    // ==================== Pagination Tests ====================

    #[tokio::test]
    async fn test_list_categories_walks_pages_with_ties() {
        let repo = InMemoryRepository::new();
        let created_at = date(2024, 1, 1);
        for i in 0..5 {
            let category = Category::new(format!("Category {i}")).with_created_at(created_at);
            repo.create_category(&category).await.unwrap();
        }

        let first = repo.list_categories(&PageRequest::first(2)).await.unwrap();
        let first = Page::new(first, 2);
        let cursor: Cursor = first.next_cursor.unwrap();

        let second = repo
            .list_categories(&PageRequest::after(2, cursor))
            .await
            .unwrap();
        let third_cursor = Page::new(second.clone(), 2).next_cursor.unwrap();
        let third = repo
            .list_categories(&PageRequest::after(2, third_cursor))
            .await
            .unwrap();

        let mut ids: Vec<Uuid> = first
            .items
            .iter()
            .chain(second.iter())
            .chain(third.iter())
            .map(|c| c.id)
            .collect();
        assert_eq!(ids.len(), 5);
        let sorted = {
            let mut sorted = ids.clone();
            sorted.sort();
            sorted
        };
        assert_eq!(ids, sorted);
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert_eq!(Page::new(third, 2).next_cursor, None);
    }
}
