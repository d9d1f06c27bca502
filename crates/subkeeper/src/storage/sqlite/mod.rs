//! Repositories over a single SQLite file via `tokio-rusqlite`.
//!
//! Foreign keys are switched on per connection, and each list query walks
//! the `(created_at, id)` index created with its table.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteRepository;
