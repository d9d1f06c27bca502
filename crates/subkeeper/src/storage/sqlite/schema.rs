//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.
//!
//! Timestamps are stored as fixed-width RFC 3339 text with microsecond
//! precision, so comparing them as strings orders them chronologically.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Categories table
CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Services table
CREATE TABLE IF NOT EXISTS services (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    category_id TEXT NOT NULL,
    website TEXT,
    logo_url TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (category_id) REFERENCES categories(id)
);

-- Orders table
CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    service_id TEXT NOT NULL,
    is_paid INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (service_id) REFERENCES services(id)
);

-- Subscriptions table
CREATE TABLE IF NOT EXISTS subscriptions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    service_id TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT,
    price INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (service_id) REFERENCES services(id)
);

-- Payments table
CREATE TABLE IF NOT EXISTS payments (
    id TEXT PRIMARY KEY,
    subscription_id TEXT NOT NULL,
    order_id TEXT NOT NULL,
    amount INTEGER NOT NULL,
    currency TEXT NOT NULL,
    paid_at TEXT NOT NULL,
    payment_status TEXT NOT NULL,
    provider TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (subscription_id) REFERENCES subscriptions(id),
    FOREIGN KEY (order_id) REFERENCES orders(id)
);

-- Keyset indexes for list queries
CREATE INDEX IF NOT EXISTS idx_users_keyset ON users(created_at, id);
CREATE INDEX IF NOT EXISTS idx_categories_keyset ON categories(created_at, id);
CREATE INDEX IF NOT EXISTS idx_services_keyset ON services(created_at, id);
CREATE INDEX IF NOT EXISTS idx_orders_keyset ON orders(created_at, id);
CREATE INDEX IF NOT EXISTS idx_payments_keyset ON payments(created_at, id);
CREATE INDEX IF NOT EXISTS idx_subscriptions_keyset ON subscriptions(created_at, id);

-- Billing lookups
CREATE INDEX IF NOT EXISTS idx_subscriptions_user_id ON subscriptions(user_id);
CREATE INDEX IF NOT EXISTS idx_subscriptions_start_date ON subscriptions(start_date);
"#;

/// Builds a keyset-paginated query over `base`.
///
/// `base` is a `SELECT ... FROM ...` without `WHERE`; `prefix` qualifies the
/// keyset columns (e.g. `"s."`). With a cursor the parameters are
/// `?1 = created_at`, `?2 = id`, `?3 = limit`; without one, `?1 = limit`.
pub fn keyset_query(base: &str, prefix: &str, has_cursor: bool) -> String {
    let mut sql = base.trim_end().to_string();
    if has_cursor {
        sql.push_str(&format!(
            "\nWHERE ({p}created_at > ?1) OR ({p}created_at = ?1 AND {p}id > ?2)",
            p = prefix
        ));
    }
    sql.push_str(&format!(
        "\nORDER BY {p}created_at ASC, {p}id ASC\nLIMIT ?{n}",
        p = prefix,
        n = if has_cursor { 3 } else { 1 }
    ));
    sql
}

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (id, email, first_name, last_name, role, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_USERS: &str = r#"
SELECT id, email, first_name, last_name, role, created_at
FROM users
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, email, first_name, last_name, role, created_at
FROM users
WHERE id = ?1
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, email, first_name, last_name, role, created_at
FROM users
WHERE email = ?1
"#;

pub const UPDATE_USER: &str = r#"
UPDATE users
SET email = ?2, first_name = ?3, last_name = ?4, role = ?5
WHERE id = ?1
"#;

pub const DELETE_USER: &str = r#"
DELETE FROM users
WHERE id = ?1
"#;

// Category queries
pub const INSERT_CATEGORY: &str = r#"
INSERT INTO categories (id, name, created_at)
VALUES (?1, ?2, ?3)
"#;

pub const SELECT_CATEGORIES: &str = r#"
SELECT id, name, created_at
FROM categories
"#;

pub const SELECT_CATEGORY_BY_ID: &str = r#"
SELECT id, name, created_at
FROM categories
WHERE id = ?1
"#;

pub const UPDATE_CATEGORY: &str = r#"
UPDATE categories
SET name = ?2
WHERE id = ?1
"#;

pub const DELETE_CATEGORY: &str = r#"
DELETE FROM categories
WHERE id = ?1
"#;

// Service queries
pub const INSERT_SERVICE: &str = r#"
INSERT INTO services (id, name, category_id, website, logo_url, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_SERVICES: &str = r#"
SELECT id, name, category_id, website, logo_url, created_at
FROM services
"#;

pub const SELECT_SERVICE_BY_ID: &str = r#"
SELECT id, name, category_id, website, logo_url, created_at
FROM services
WHERE id = ?1
"#;

pub const UPDATE_SERVICE: &str = r#"
UPDATE services
SET name = ?2, category_id = ?3, website = ?4, logo_url = ?5
WHERE id = ?1
"#;

pub const DELETE_SERVICE: &str = r#"
DELETE FROM services
WHERE id = ?1
"#;

// Order queries
pub const INSERT_ORDER: &str = r#"
INSERT INTO orders (id, user_id, service_id, is_paid, created_at)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const SELECT_ORDERS: &str = r#"
SELECT id, user_id, service_id, is_paid, created_at
FROM orders
"#;

pub const SELECT_ORDER_BY_ID: &str = r#"
SELECT id, user_id, service_id, is_paid, created_at
FROM orders
WHERE id = ?1
"#;

pub const UPDATE_ORDER: &str = r#"
UPDATE orders
SET is_paid = ?2
WHERE id = ?1
"#;

pub const DELETE_ORDER: &str = r#"
DELETE FROM orders
WHERE id = ?1
"#;

// Payment queries
pub const INSERT_PAYMENT: &str = r#"
INSERT INTO payments (id, subscription_id, order_id, amount, currency, paid_at, payment_status, provider, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub const SELECT_PAYMENTS: &str = r#"
SELECT id, subscription_id, order_id, amount, currency, paid_at, payment_status, provider, created_at
FROM payments
"#;

pub const SELECT_PAYMENT_BY_ID: &str = r#"
SELECT id, subscription_id, order_id, amount, currency, paid_at, payment_status, provider, created_at
FROM payments
WHERE id = ?1
"#;

pub const UPDATE_PAYMENT: &str = r#"
UPDATE payments
SET amount = ?2, currency = ?3, paid_at = ?4, payment_status = ?5, provider = ?6
WHERE id = ?1
"#;

pub const DELETE_PAYMENT: &str = r#"
DELETE FROM payments
WHERE id = ?1
"#;

// Subscription queries
pub const INSERT_SUBSCRIPTION: &str = r#"
INSERT INTO subscriptions (id, user_id, service_id, start_date, end_date, price, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_SUBSCRIPTION_BY_ID: &str = r#"
SELECT id, user_id, service_id, start_date, end_date, price, created_at
FROM subscriptions
WHERE id = ?1
"#;

pub const SELECT_SUBSCRIPTION_VIEWS: &str = r#"
SELECT s.id, s.user_id, s.service_id, v.name, s.start_date, s.end_date, s.price, s.created_at
FROM subscriptions s
INNER JOIN services v ON v.id = s.service_id
"#;

pub const UPDATE_SUBSCRIPTION: &str = r#"
UPDATE subscriptions
SET start_date = ?2, end_date = ?3, price = ?4
WHERE id = ?1
"#;

pub const DELETE_SUBSCRIPTION: &str = r#"
DELETE FROM subscriptions
WHERE id = ?1
"#;

/// Billing pre-filter. `?3` and `?4` are NULL when the filter is unset.
pub const SELECT_SUBSCRIPTIONS_FOR_TOTAL: &str = r#"
SELECT s.start_date, s.end_date, s.price, v.name
FROM subscriptions s
INNER JOIN services v ON v.id = s.service_id
WHERE s.start_date <= ?2
  AND (s.end_date IS NULL OR s.end_date >= ?1)
  AND (?3 IS NULL OR s.user_id = ?3)
  AND (?4 IS NULL OR v.name = ?4)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_valid_sql() {
        for table in [
            "users",
            "categories",
            "services",
            "orders",
            "subscriptions",
            "payments",
        ] {
            assert!(
                CREATE_TABLES.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
                "missing table {table}"
            );
        }
        assert!(CREATE_TABLES.contains("PRAGMA foreign_keys = ON"));
    }

    #[test]
    fn test_keyset_query_without_cursor() {
        let sql = keyset_query(SELECT_CATEGORIES, "", false);

        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("ORDER BY created_at ASC, id ASC\nLIMIT ?1"));
    }

    #[test]
    fn test_keyset_query_with_cursor() {
        let sql = keyset_query(SELECT_SUBSCRIPTION_VIEWS, "s.", true);

        assert!(sql.contains(
            "WHERE (s.created_at > ?1) OR (s.created_at = ?1 AND s.id > ?2)"
        ));
        assert!(sql.ends_with("ORDER BY s.created_at ASC, s.id ASC\nLIMIT ?3"));
    }

    #[test]
    fn test_queries_contain_expected_keywords() {
        assert!(SELECT_USER_BY_EMAIL.contains("email = ?1"));
        assert!(UPDATE_USER.contains("UPDATE"));
        assert!(DELETE_CATEGORY.contains("DELETE"));
        assert!(SELECT_SUBSCRIPTION_VIEWS.contains("JOIN"));
        assert!(SELECT_SUBSCRIPTIONS_FOR_TOTAL.contains("end_date IS NULL"));
    }
}
