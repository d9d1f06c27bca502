//! Redis cache backend implementation.
//!
//! Provides a shared cache for multi-instance deployments, with connection
//! management handled by `redis::aio::ConnectionManager`.

mod cache;
mod error;

pub use cache::RedisCache;
