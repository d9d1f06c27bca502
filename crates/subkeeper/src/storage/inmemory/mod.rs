//! Map-backed repositories.
//!
//! Lists go through [`subkeeper_core::pagination::paginate`] so they order
//! exactly like the SQLite keyset queries, and inserts and deletes check
//! references the way SQLite foreign keys would.

mod repository;

pub use repository::InMemoryRepository;
