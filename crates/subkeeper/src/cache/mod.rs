//! Cache backends plus [`EntityCache`], the typed read-through layer the
//! services use.
//!
//! The backend is chosen at build time: `memory` (default) keeps an LRU map in
//! the process, `redis` talks to a shared server. Exactly one must be enabled;
//! tests always get the memory backend.

#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!(
    "Features 'memory' and 'redis' are mutually exclusive. \
    Enable only one cache backend at a time."
);

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!(
    "No cache backend selected. Enable 'memory' or 'redis' feature. \
    Example: cargo build -p subkeeper --features memory"
);

mod entity;

#[cfg(any(feature = "memory", test))]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

pub use entity::EntityCache;

#[cfg(any(feature = "memory", test))]
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
