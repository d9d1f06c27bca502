use subkeeper_core::domain::ValidationError;
use subkeeper_core::storage::RepositoryError;
use thiserror::Error;
use uuid::Uuid;

/// Failure of a service operation.
///
/// Cache failures never appear here; they are logged and absorbed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        ServiceError::Repository(RepositoryError::NotFound {
            entity_type,
            id: id.to_string(),
        })
    }
}

/// Turns an absent entity into a NotFound error.
pub(crate) fn found<T>(value: Option<T>, entity_type: &'static str, id: Uuid) -> Result<T> {
    value.ok_or_else(|| ServiceError::not_found(entity_type, id))
}
