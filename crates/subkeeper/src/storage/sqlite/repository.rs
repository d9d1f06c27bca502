//! SQLite repository implementation.
//!
//! Implements the repository traits from `subkeeper_core::storage` using SQLite.

use async_trait::async_trait;
use rusqlite::Row;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use subkeeper_core::billing::{BillingFilter, SubscriptionRow};
use subkeeper_core::domain::{
    Category, Order, Payment, Service, Subscription, SubscriptionView, User,
};
use subkeeper_core::pagination::PageRequest;
use subkeeper_core::storage::{
    CategoryRepository, OrderRepository, PaymentRepository, RepositoryError, Result,
    ServiceRepository, SubscriptionRepository, UserRepository,
};

use super::conversions::{
    format_datetime, row_to_category, row_to_order, row_to_payment, row_to_service,
    row_to_subscription, row_to_subscription_row, row_to_subscription_view, row_to_user,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Turns "no row changed" into `QueryReturnedNoRows`, which maps to NotFound.
fn require_changed(rows: usize) -> std::result::Result<(), tokio_rusqlite::Error> {
    if rows == 0 {
        Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
    } else {
        Ok(())
    }
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for all entity types.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    /// Fetches at most one row by id.
    async fn select_by_id<T, F>(
        &self,
        sql: &'static str,
        id: Uuid,
        entity_type: &'static str,
        map_row: F,
    ) -> Result<Option<T>>
    where
        T: Send + 'static,
        F: Fn(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                match stmt.query_row([&id_str], map_row) {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, entity_type, id.to_string()))
    }

    /// Runs a keyset-paginated list query built from `base`.
    async fn select_page<T, F>(
        &self,
        base: &'static str,
        prefix: &'static str,
        page: &PageRequest,
        entity_type: &'static str,
        map_row: F,
    ) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: Fn(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        let cursor = page
            .after
            .map(|c| (format_datetime(&c.created_at), c.id.to_string()));
        let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);

        self.conn
            .call(move |conn| {
                let sql = schema::keyset_query(base, prefix, cursor.is_some());
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let rows = match &cursor {
                    Some((created_at, id)) => {
                        stmt.query_map(rusqlite::params![created_at, id, limit], &map_row)
                    }
                    None => stmt.query_map(rusqlite::params![limit], &map_row),
                }
                .map_err(wrap_err)?;

                let mut results = Vec::new();
                for row_result in rows {
                    results.push(row_result.map_err(wrap_err)?);
                }
                Ok(results)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, entity_type))
    }

    /// Deletes a row by id, failing with NotFound when nothing was removed.
    async fn delete_by_id(
        &self,
        sql: &'static str,
        id: Uuid,
        entity_type: &'static str,
    ) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn.execute(sql, [&id_str]).map_err(wrap_err)?;
                require_changed(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, entity_type, id.to_string()))
    }
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.select_by_id(schema::SELECT_USER_BY_ID, id, "User", row_to_user)
            .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_USER_BY_EMAIL).map_err(wrap_err)?;
                match stmt.query_row([&email], row_to_user) {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }

    async fn list_users(&self, page: &PageRequest) -> Result<Vec<User>> {
        self.select_page(schema::SELECT_USERS, "", page, "User", row_to_user)
            .await
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let id = user.id.to_string();
        let email = user.email.clone();
        let first_name = user.first_name.clone();
        let last_name = user.last_name.clone();
        let role = user.role.as_str();
        let created_at = format_datetime(&user.created_at);
        let user_email = user.email.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_USER,
                    rusqlite::params![id, email, first_name, last_name, role, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", user_email))
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let id = user.id.to_string();
        let email = user.email.clone();
        let first_name = user.first_name.clone();
        let last_name = user.last_name.clone();
        let role = user.role.as_str();
        let user_id = user.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_USER,
                        rusqlite::params![id, email, first_name, last_name, role],
                    )
                    .map_err(wrap_err)?;
                require_changed(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", user_id))
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        self.delete_by_id(schema::DELETE_USER, id, "User").await
    }
}

// ============================================================================
// CategoryRepository implementation
// ============================================================================

#[async_trait]
impl CategoryRepository for SqliteRepository {
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        self.select_by_id(schema::SELECT_CATEGORY_BY_ID, id, "Category", row_to_category)
            .await
    }

    async fn list_categories(&self, page: &PageRequest) -> Result<Vec<Category>> {
        self.select_page(schema::SELECT_CATEGORIES, "", page, "Category", row_to_category)
            .await
    }

    async fn create_category(&self, category: &Category) -> Result<()> {
        let id = category.id.to_string();
        let name = category.name.clone();
        let created_at = format_datetime(&category.created_at);
        let category_id = category.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_CATEGORY,
                    rusqlite::params![id, name, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Category", category_id))
    }

    async fn update_category(&self, category: &Category) -> Result<()> {
        let id = category.id.to_string();
        let name = category.name.clone();
        let category_id = category.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::UPDATE_CATEGORY, rusqlite::params![id, name])
                    .map_err(wrap_err)?;
                require_changed(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Category", category_id))
    }

    async fn delete_category(&self, id: Uuid) -> Result<()> {
        self.delete_by_id(schema::DELETE_CATEGORY, id, "Category")
            .await
    }
}

// ============================================================================
// ServiceRepository implementation
// ============================================================================

#[async_trait]
impl ServiceRepository for SqliteRepository {
    async fn get_service(&self, id: Uuid) -> Result<Option<Service>> {
        self.select_by_id(schema::SELECT_SERVICE_BY_ID, id, "Service", row_to_service)
            .await
    }

    async fn list_services(&self, page: &PageRequest) -> Result<Vec<Service>> {
        self.select_page(schema::SELECT_SERVICES, "", page, "Service", row_to_service)
            .await
    }

    async fn create_service(&self, service: &Service) -> Result<()> {
        let id = service.id.to_string();
        let name = service.name.clone();
        let category_id = service.category_id.to_string();
        let website = service.website.clone();
        let logo_url = service.logo_url.clone();
        let created_at = format_datetime(&service.created_at);
        let service_id = service.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_SERVICE,
                    rusqlite::params![id, name, category_id, website, logo_url, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Service", service_id))
    }

    async fn update_service(&self, service: &Service) -> Result<()> {
        let id = service.id.to_string();
        let name = service.name.clone();
        let category_id = service.category_id.to_string();
        let website = service.website.clone();
        let logo_url = service.logo_url.clone();
        let service_id = service.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_SERVICE,
                        rusqlite::params![id, name, category_id, website, logo_url],
                    )
                    .map_err(wrap_err)?;
                require_changed(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Service", service_id))
    }

    async fn delete_service(&self, id: Uuid) -> Result<()> {
        self.delete_by_id(schema::DELETE_SERVICE, id, "Service")
            .await
    }
}

// ============================================================================
// OrderRepository implementation
// ============================================================================

#[async_trait]
impl OrderRepository for SqliteRepository {
    async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
        self.select_by_id(schema::SELECT_ORDER_BY_ID, id, "Order", row_to_order)
            .await
    }

    async fn list_orders(&self, page: &PageRequest) -> Result<Vec<Order>> {
        self.select_page(schema::SELECT_ORDERS, "", page, "Order", row_to_order)
            .await
    }

    async fn create_order(&self, order: &Order) -> Result<()> {
        let id = order.id.to_string();
        let user_id = order.user_id.to_string();
        let service_id = order.service_id.to_string();
        let is_paid = order.is_paid;
        let created_at = format_datetime(&order.created_at);
        let order_id = order.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_ORDER,
                    rusqlite::params![id, user_id, service_id, is_paid, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Order", order_id))
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        let id = order.id.to_string();
        let is_paid = order.is_paid;
        let order_id = order.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::UPDATE_ORDER, rusqlite::params![id, is_paid])
                    .map_err(wrap_err)?;
                require_changed(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Order", order_id))
    }

    async fn delete_order(&self, id: Uuid) -> Result<()> {
        self.delete_by_id(schema::DELETE_ORDER, id, "Order").await
    }
}

// ============================================================================
// PaymentRepository implementation
// ============================================================================

#[async_trait]
impl PaymentRepository for SqliteRepository {
    async fn get_payment(&self, id: Uuid) -> Result<Option<Payment>> {
        self.select_by_id(schema::SELECT_PAYMENT_BY_ID, id, "Payment", row_to_payment)
            .await
    }

    async fn list_payments(&self, page: &PageRequest) -> Result<Vec<Payment>> {
        self.select_page(schema::SELECT_PAYMENTS, "", page, "Payment", row_to_payment)
            .await
    }

    async fn create_payment(&self, payment: &Payment) -> Result<()> {
        let id = payment.id.to_string();
        let subscription_id = payment.subscription_id.to_string();
        let order_id = payment.order_id.to_string();
        let amount = payment.amount;
        let currency = payment.currency.clone();
        let paid_at = format_datetime(&payment.paid_at);
        let payment_status = payment.payment_status.as_str();
        let provider = payment.provider.clone();
        let created_at = format_datetime(&payment.created_at);
        let payment_id = payment.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_PAYMENT,
                    rusqlite::params![
                        id,
                        subscription_id,
                        order_id,
                        amount,
                        currency,
                        paid_at,
                        payment_status,
                        provider,
                        created_at
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Payment", payment_id))
    }

    async fn update_payment(&self, payment: &Payment) -> Result<()> {
        let id = payment.id.to_string();
        let amount = payment.amount;
        let currency = payment.currency.clone();
        let paid_at = format_datetime(&payment.paid_at);
        let payment_status = payment.payment_status.as_str();
        let provider = payment.provider.clone();
        let payment_id = payment.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_PAYMENT,
                        rusqlite::params![id, amount, currency, paid_at, payment_status, provider],
                    )
                    .map_err(wrap_err)?;
                require_changed(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Payment", payment_id))
    }

    async fn delete_payment(&self, id: Uuid) -> Result<()> {
        self.delete_by_id(schema::DELETE_PAYMENT, id, "Payment")
            .await
    }
}

// ============================================================================
// SubscriptionRepository implementation
// ============================================================================

#[async_trait]
impl SubscriptionRepository for SqliteRepository {
    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
        self.select_by_id(
            schema::SELECT_SUBSCRIPTION_BY_ID,
            id,
            "Subscription",
            row_to_subscription,
        )
        .await
    }

    async fn list_subscriptions(&self, page: &PageRequest) -> Result<Vec<SubscriptionView>> {
        self.select_page(
            schema::SELECT_SUBSCRIPTION_VIEWS,
            "s.",
            page,
            "Subscription",
            row_to_subscription_view,
        )
        .await
    }

    async fn create_subscription(&self, subscription: &Subscription) -> Result<()> {
        let id = subscription.id.to_string();
        let user_id = subscription.user_id.to_string();
        let service_id = subscription.service_id.to_string();
        let start_date = format_datetime(&subscription.start_date);
        let end_date = subscription.end_date.as_ref().map(format_datetime);
        let price = subscription.price;
        let created_at = format_datetime(&subscription.created_at);
        let subscription_id = subscription.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_SUBSCRIPTION,
                    rusqlite::params![
                        id, user_id, service_id, start_date, end_date, price, created_at
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Subscription", subscription_id))
    }

    async fn update_subscription(&self, subscription: &Subscription) -> Result<()> {
        let id = subscription.id.to_string();
        let start_date = format_datetime(&subscription.start_date);
        let end_date = subscription.end_date.as_ref().map(format_datetime);
        let price = subscription.price;
        let subscription_id = subscription.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_SUBSCRIPTION,
                        rusqlite::params![id, start_date, end_date, price],
                    )
                    .map_err(wrap_err)?;
                require_changed(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Subscription", subscription_id))
    }

    async fn delete_subscription(&self, id: Uuid) -> Result<()> {
        self.delete_by_id(schema::DELETE_SUBSCRIPTION, id, "Subscription")
            .await
    }

    async fn find_for_total(&self, filter: &BillingFilter) -> Result<Vec<SubscriptionRow>> {
        let from = format_datetime(&filter.window.from);
        let to = format_datetime(&filter.window.to);
        let user_id = filter.user_id.map(|id| id.to_string());
        let service_name = filter.service_name.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_SUBSCRIPTIONS_FOR_TOTAL)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map(
                        rusqlite::params![from, to, user_id, service_name],
                        row_to_subscription_row,
                    )
                    .map_err(wrap_err)?;

                let mut results = Vec::new();
                for row_result in rows {
                    results.push(row_result.map_err(wrap_err)?);
                }
                Ok(results)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Subscription"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use subkeeper_core::billing::{calculate_total, BillingWindow};
    use subkeeper_core::domain::PaymentStatus;
    use subkeeper_core::pagination::Page;

    fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    async fn seeded() -> (SqliteRepository, User, Service) {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let user = User::new("alice@example.com", "Alice", "Smith");
        let category = Category::new("Streaming");
        let service = Service::new("Netflix", category.id).with_website("https://netflix.com");

        repo.create_user(&user).await.unwrap();
        repo.create_category(&category).await.unwrap();
        repo.create_service(&service).await.unwrap();

        (repo, user, service)
    }

    #[tokio::test]
    async fn test_user_roundtrip_and_lookup_by_email() {
        let (repo, user, _) = seeded().await;

        assert_eq!(repo.get_user(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.get_user_by_email("alice@example.com").await.unwrap(),
            Some(user)
        );
        assert!(repo
            .get_user_by_email("bob@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_already_exists() {
        let (repo, _, _) = seeded().await;
        let twin = User::new("alice@example.com", "Alice", "Jones");

        let result = repo.create_user(&twin).await;

        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let category = Category::new("Ghost");

        let result = repo.update_category(&category).await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_found() {
        let repo = SqliteRepository::new_in_memory().await.unwrap();

        let result = repo.delete_order(Uuid::new_v4()).await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let service = Service::new("Netflix", Uuid::new_v4());

        let result = repo.create_service(&service).await;

        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_payment_roundtrip() {
        let (repo, user, service) = seeded().await;
        let order = Order::new(user.id, service.id);
        let sub = Subscription::new(user.id, service.id, date(2024, 1, 1), 999);
        repo.create_order(&order).await.unwrap();
        repo.create_subscription(&sub).await.unwrap();

        let now = subkeeper_core::domain::timestamp_now();
        let mut payment = Payment {
            id: Uuid::new_v4(),
            subscription_id: sub.id,
            order_id: order.id,
            amount: 999,
            currency: "EUR".to_string(),
            paid_at: now,
            payment_status: PaymentStatus::Failed,
            provider: "stripe".to_string(),
            created_at: now,
        };
        repo.create_payment(&payment).await.unwrap();
        assert_eq!(
            repo.get_payment(payment.id).await.unwrap(),
            Some(payment.clone())
        );

        payment.payment_status = PaymentStatus::Success;
        repo.update_payment(&payment).await.unwrap();
        assert_eq!(
            repo.get_payment(payment.id).await.unwrap().unwrap().payment_status,
            PaymentStatus::Success
        );
    }

    #[tokio::test]
    async fn test_subscription_view_and_update() {
        let (repo, user, service) = seeded().await;
        let mut sub = Subscription::new(user.id, service.id, date(2024, 1, 15), 100);
        repo.create_subscription(&sub).await.unwrap();

        let views = repo.list_subscriptions(&PageRequest::first(10)).await.unwrap();
        assert_eq!(views, vec![SubscriptionView::new(&sub, "Netflix")]);

        sub.end_date = Some(date(2024, 6, 30));
        sub.price = 120;
        repo.update_subscription(&sub).await.unwrap();

        assert_eq!(repo.get_subscription(sub.id).await.unwrap(), Some(sub));
    }

    #[tokio::test]
    async fn test_list_pages_follow_keyset_order_with_ties() {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let created_at = date(2024, 1, 1);
        let mut expected = Vec::new();
        for i in 0..7 {
            let category = Category::new(format!("Category {i}")).with_created_at(created_at);
            repo.create_category(&category).await.unwrap();
            expected.push(category);
        }
        let late = Category::new("Late").with_created_at(date(2024, 2, 1));
        repo.create_category(&late).await.unwrap();
        expected.sort_by_key(|c| c.id);
        expected.push(late);

        let mut collected = Vec::new();
        let mut request = PageRequest::first(3);
        loop {
            let page = Page::new(repo.list_categories(&request).await.unwrap(), 3);
            collected.extend(page.items);
            match page.next_cursor {
                Some(cursor) => request = PageRequest::after(3, cursor),
                None => break,
            }
        }

        assert_eq!(collected, expected);
    }

    #[tokio::test]
    async fn test_find_for_total_matches_billing_examples() {
        let (repo, user, service) = seeded().await;
        let subs = [
            Subscription::new(user.id, service.id, date(2024, 1, 15), 100),
            Subscription::new(user.id, service.id, date(2024, 2, 1), 50)
                .with_end_date(date(2024, 2, 20)),
            Subscription::new(user.id, service.id, date(2023, 1, 1), 999)
                .with_end_date(date(2023, 12, 1)),
        ];
        for sub in &subs {
            repo.create_subscription(sub).await.unwrap();
        }

        let window = BillingWindow::from_months("01-2024", "03-2024").unwrap();
        let rows = repo
            .find_for_total(&BillingFilter::new(window).with_service_name("Netflix"))
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(calculate_total(&rows, &window), Ok(350));

        let none = repo
            .find_for_total(&BillingFilter::new(window).with_service_name("netflix"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
