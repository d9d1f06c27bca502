pub mod categories;
pub mod error;
pub mod health;
pub mod orders;
pub mod payments;
mod query;
pub mod services;
pub mod subscriptions;
pub mod users;

pub use error::AppError;
