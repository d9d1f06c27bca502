use async_trait::async_trait;
use uuid::Uuid;

use crate::billing::{BillingFilter, SubscriptionRow};
use crate::domain::{Category, Order, Payment, Service, Subscription, SubscriptionView, User};
use crate::pagination::PageRequest;

use super::Result;

/// Repository for user operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets a user by their email address.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Lists users in keyset order.
    async fn list_users(&self, page: &PageRequest) -> Result<Vec<User>>;

    async fn create_user(&self, user: &User) -> Result<()>;

    async fn update_user(&self, user: &User) -> Result<()>;

    async fn delete_user(&self, id: Uuid) -> Result<()>;
}

/// Repository for category operations.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>>;

    async fn list_categories(&self, page: &PageRequest) -> Result<Vec<Category>>;

    async fn create_category(&self, category: &Category) -> Result<()>;

    async fn update_category(&self, category: &Category) -> Result<()>;

    async fn delete_category(&self, id: Uuid) -> Result<()>;
}

/// Repository for service operations.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn get_service(&self, id: Uuid) -> Result<Option<Service>>;

    async fn list_services(&self, page: &PageRequest) -> Result<Vec<Service>>;

    async fn create_service(&self, service: &Service) -> Result<()>;

    async fn update_service(&self, service: &Service) -> Result<()>;

    async fn delete_service(&self, id: Uuid) -> Result<()>;
}

/// Repository for order operations.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;

    async fn list_orders(&self, page: &PageRequest) -> Result<Vec<Order>>;

    async fn create_order(&self, order: &Order) -> Result<()>;

    async fn update_order(&self, order: &Order) -> Result<()>;

    async fn delete_order(&self, id: Uuid) -> Result<()>;
}

/// Repository for payment operations.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn get_payment(&self, id: Uuid) -> Result<Option<Payment>>;

    async fn list_payments(&self, page: &PageRequest) -> Result<Vec<Payment>>;

    async fn create_payment(&self, payment: &Payment) -> Result<()>;

    async fn update_payment(&self, payment: &Payment) -> Result<()>;

    async fn delete_payment(&self, id: Uuid) -> Result<()>;
}

/// Repository for subscription operations.
///
/// Single reads return the bare [`Subscription`]; listings are joined with
/// the service name into [`SubscriptionView`]s.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>>;

    /// Lists subscriptions joined with their service names, in keyset order.
    async fn list_subscriptions(&self, page: &PageRequest) -> Result<Vec<SubscriptionView>>;

    async fn create_subscription(&self, subscription: &Subscription) -> Result<()>;

    async fn update_subscription(&self, subscription: &Subscription) -> Result<()>;

    async fn delete_subscription(&self, id: Uuid) -> Result<()>;

    /// Fetches the billing projection of every subscription the filter admits.
    async fn find_for_total(&self, filter: &BillingFilter) -> Result<Vec<SubscriptionRow>>;
}
