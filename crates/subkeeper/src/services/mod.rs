//! Application services: request validation, read-through caching and
//! repository calls for each entity.
//!
//! Every service follows the same policy. Reads go through an
//! [`EntityCache`](crate::cache::EntityCache) and fall back to the repository
//! on any miss or cache failure. Creates write the new entity through to the
//! cache; updates and deletes only invalidate.

mod categories;
mod catalog;
mod error;
mod orders;
mod payments;
mod subscriptions;
mod users;

pub use categories::CategoryService;
pub use catalog::CatalogService;
pub use error::{Result, ServiceError};
pub use orders::OrderService;
pub use payments::PaymentService;
pub use subscriptions::SubscriptionService;
pub use users::UserService;
