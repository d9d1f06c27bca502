//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;

use subkeeper_core::billing::SubscriptionRow;
use subkeeper_core::domain::{
    Category, Order, Payment, PaymentStatus, Role, Service, Subscription, SubscriptionView, User,
};

// ============================================================================
// Entity conversions
// ============================================================================

/// Convert a SQLite row to a User.
///
/// Expected columns: id, email, first_name, last_name, role, created_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let role: String = row.get(4)?;
    let created_at: String = row.get(5)?;

    Ok(User {
        id: parse_uuid(&id)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        role: parse_enum::<Role>(&role)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a SQLite row to a Category.
///
/// Expected columns: id, name, created_at
pub fn row_to_category(row: &Row) -> rusqlite::Result<Category> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(2)?;

    Ok(Category {
        id: parse_uuid(&id)?,
        name: row.get(1)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a SQLite row to a Service.
///
/// Expected columns: id, name, category_id, website, logo_url, created_at
pub fn row_to_service(row: &Row) -> rusqlite::Result<Service> {
    let id: String = row.get(0)?;
    let category_id: String = row.get(2)?;
    let created_at: String = row.get(5)?;

    Ok(Service {
        id: parse_uuid(&id)?,
        name: row.get(1)?,
        category_id: parse_uuid(&category_id)?,
        website: row.get(3)?,
        logo_url: row.get(4)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a SQLite row to an Order.
///
/// Expected columns: id, user_id, service_id, is_paid, created_at
pub fn row_to_order(row: &Row) -> rusqlite::Result<Order> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let service_id: String = row.get(2)?;
    let created_at: String = row.get(4)?;

    Ok(Order {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        service_id: parse_uuid(&service_id)?,
        is_paid: row.get(3)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a SQLite row to a Payment.
///
/// Expected columns: id, subscription_id, order_id, amount, currency, paid_at,
/// payment_status, provider, created_at
pub fn row_to_payment(row: &Row) -> rusqlite::Result<Payment> {
    let id: String = row.get(0)?;
    let subscription_id: String = row.get(1)?;
    let order_id: String = row.get(2)?;
    let paid_at: String = row.get(5)?;
    let payment_status: String = row.get(6)?;
    let created_at: String = row.get(8)?;

    Ok(Payment {
        id: parse_uuid(&id)?,
        subscription_id: parse_uuid(&subscription_id)?,
        order_id: parse_uuid(&order_id)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
        paid_at: parse_datetime(&paid_at)?,
        payment_status: parse_enum::<PaymentStatus>(&payment_status)?,
        provider: row.get(7)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a SQLite row to a Subscription.
///
/// Expected columns: id, user_id, service_id, start_date, end_date, price, created_at
pub fn row_to_subscription(row: &Row) -> rusqlite::Result<Subscription> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let service_id: String = row.get(2)?;
    let start_date: String = row.get(3)?;
    let end_date: Option<String> = row.get(4)?;
    let created_at: String = row.get(6)?;

    Ok(Subscription {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        service_id: parse_uuid(&service_id)?,
        start_date: parse_datetime(&start_date)?,
        end_date: end_date.as_deref().map(parse_datetime).transpose()?,
        price: row.get(5)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a joined row to a SubscriptionView.
///
/// Expected columns: id, user_id, service_id, service_name, start_date,
/// end_date, price, created_at
pub fn row_to_subscription_view(row: &Row) -> rusqlite::Result<SubscriptionView> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let service_id: String = row.get(2)?;
    let start_date: String = row.get(4)?;
    let end_date: Option<String> = row.get(5)?;
    let created_at: String = row.get(7)?;

    Ok(SubscriptionView {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        service_id: parse_uuid(&service_id)?,
        service_name: row.get(3)?,
        start_date: parse_datetime(&start_date)?,
        end_date: end_date.as_deref().map(parse_datetime).transpose()?,
        price: row.get(6)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a billing row.
///
/// Expected columns: start_date, end_date, price, service_name
pub fn row_to_subscription_row(row: &Row) -> rusqlite::Result<SubscriptionRow> {
    let start_date: String = row.get(0)?;
    let end_date: Option<String> = row.get(1)?;

    Ok(SubscriptionRow {
        start_date: parse_datetime(&start_date)?,
        end_date: end_date.as_deref().map(parse_datetime).transpose()?,
        price: row.get(2)?,
        service_name: row.get(3)?,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn conversion_error<E>(err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

/// Parse a UUID from string.
fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(conversion_error)
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(conversion_error)
}

/// Parse a stored enum such as `Role` or `PaymentStatus`.
fn parse_enum<T>(s: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse::<T>().map_err(conversion_error)
}

/// Format a DateTime<Utc> for SQLite storage.
///
/// Always `YYYY-MM-DDTHH:MM:SS.ffffffZ`, so text comparison in SQL matches
/// chronological order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
