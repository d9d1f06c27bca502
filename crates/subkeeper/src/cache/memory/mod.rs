//! In-memory cache backend implementation.
//!
//! Provides a bounded LRU cache with TTL support for single-instance
//! deployments and tests.

mod cache;

pub use cache::MemoryCache;
