//! Functional core for subkeeper.
//!
//! Pure domain types, the cache contract, keyset pagination, billing
//! arithmetic and repository traits. Everything with I/O lives in the
//! `subkeeper` binary crate.

pub mod billing;
pub mod cache;
pub mod domain;
pub mod pagination;
pub mod serde;
pub mod storage;
