use thiserror::Error;

/// Failure of a storage operation.
///
/// Backends translate their driver errors into these variants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Lookup by id found nothing (update and delete only; `get` returns
    /// `Ok(None)`).
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    /// Unique constraint, e.g. a second user with the same email.
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Dangling foreign key, or a delete blocked by dependents.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// HTTP status a handler answers with for this failure.
    ///
    /// ```
    /// use subkeeper_core::storage::RepositoryError;
    ///
    /// let missing = RepositoryError::NotFound {
    ///     entity_type: "Category",
    ///     id: "abc-123".to_string(),
    /// };
    /// assert_eq!(missing.status_code(), 404);
    /// ```
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::AlreadyExists { .. } => 409,
            Self::InvalidData(_) => 400,
            Self::ConnectionFailed(_) => 503,
            Self::QueryFailed(_) | Self::Serialization(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
