use std::{env, str::FromStr, time::Duration};

use subkeeper_core::pagination::{LimitPolicy, DEFAULT_LIMIT, MAX_LIMIT};

/// Per-entity cache TTLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTtls {
    pub user: Duration,
    pub category: Duration,
    pub service: Duration,
    pub order: Duration,
    pub payment: Duration,
    pub subscription: Duration,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of in-memory cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Upper bound for a single cache call (default: 3s)
    pub cache_timeout: Duration,
    pub cache_ttls: CacheTtls,
    /// Page size bounds for list endpoints (default: 20, max 100)
    pub page_limits: LimitPolicy,
    /// Whole-request deadline enforced by the router (default: 10s)
    pub request_timeout: Duration,
    /// Path to SQLite database file (default: "subkeeper.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
}

/// Reads and parses a variable, falling back to `default` when it is unset
/// or does not parse.
fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn secs_or(name: &str, default: u64) -> Duration {
    Duration::from_secs(parse_or(name, default))
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_TIMEOUT_MS` - Deadline for one cache call (default: 3000)
    /// - `{USER,CATEGORY,SERVICE,ORDER}_CACHE_TTL_SECONDS` - (default: 300)
    /// - `{PAYMENT,SUBSCRIPTION}_CACHE_TTL_SECONDS` - (default: 600)
    /// - `PAGE_DEFAULT_LIMIT` / `PAGE_MAX_LIMIT` - (default: 20 / 100)
    /// - `REQUEST_TIMEOUT_SECONDS` - Request deadline (default: 10)
    /// - `SQLITE_PATH` - SQLite database path (default: "subkeeper.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Self {
        let max = parse_or("PAGE_MAX_LIMIT", MAX_LIMIT).max(1);
        let default = parse_or("PAGE_DEFAULT_LIMIT", DEFAULT_LIMIT).clamp(1, max);

        Self {
            cache_max_entries: parse_or("CACHE_MAX_ENTRIES", 10_000),
            cache_timeout: Duration::from_millis(parse_or("CACHE_TIMEOUT_MS", 3_000)),
            cache_ttls: CacheTtls {
                user: secs_or("USER_CACHE_TTL_SECONDS", 300),
                category: secs_or("CATEGORY_CACHE_TTL_SECONDS", 300),
                service: secs_or("SERVICE_CACHE_TTL_SECONDS", 300),
                order: secs_or("ORDER_CACHE_TTL_SECONDS", 300),
                payment: secs_or("PAYMENT_CACHE_TTL_SECONDS", 600),
                subscription: secs_or("SUBSCRIPTION_CACHE_TTL_SECONDS", 600),
            },
            page_limits: LimitPolicy { default, max },
            request_timeout: secs_or("REQUEST_TIMEOUT_SECONDS", 10),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "subkeeper.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
