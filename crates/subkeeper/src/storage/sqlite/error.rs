//! Translation of SQLite failures into repository errors.
//!
//! Constraint codes carry meaning for the API: a unique or primary-key hit
//! is a duplicate, a foreign-key hit is a reference to a missing row or a
//! delete blocked by dependents.

use rusqlite::{ffi, ErrorCode};
use subkeeper_core::storage::RepositoryError;

fn from_rusqlite(err: &rusqlite::Error, entity_type: &'static str, id: &str) -> RepositoryError {
    let rusqlite::Error::SqliteFailure(failure, _) = err else {
        return match err {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity_type,
                id: id.to_string(),
            },
            _ => RepositoryError::QueryFailed(err.to_string()),
        };
    };

    match (failure.code, failure.extended_code) {
        (_, ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
            RepositoryError::AlreadyExists {
                entity_type,
                id: id.to_string(),
            }
        }
        (_, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => RepositoryError::InvalidData(format!(
            "{entity_type} references a missing row or is still referenced"
        )),
        (ErrorCode::CannotOpen, _) => {
            RepositoryError::ConnectionFailed(format!("Cannot open database: {err}"))
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

fn translate(err: tokio_rusqlite::Error, entity_type: &'static str, id: &str) -> RepositoryError {
    match err {
        tokio_rusqlite::Error::Rusqlite(ref inner) => from_rusqlite(inner, entity_type, id),
        tokio_rusqlite::Error::Close(_) => {
            RepositoryError::ConnectionFailed("SQLite connection closed".to_string())
        }
        other => RepositoryError::QueryFailed(other.to_string()),
    }
}

/// For statements not tied to one id (listing, inserts of fresh rows).
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
) -> RepositoryError {
    translate(err, entity_type, "unknown")
}

pub fn map_tokio_rusqlite_error_with_id(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    translate(err, entity_type, &id.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(extended_code: i32) -> tokio_rusqlite::Error {
        let sqlite_err = ffi::Error {
            code: rusqlite::ErrorCode::ConstraintViolation,
            extended_code,
        };
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(sqlite_err, None))
    }

    #[test]
    fn test_unique_constraint_maps_to_already_exists() {
        let err = constraint(ffi::SQLITE_CONSTRAINT_UNIQUE);

        let result = map_tokio_rusqlite_error_with_id(err, "User", "a@b.c");

        assert_eq!(
            result,
            RepositoryError::AlreadyExists {
                entity_type: "User",
                id: "a@b.c".to_string(),
            }
        );
    }

    #[test]
    fn test_primary_key_without_id_reports_unknown() {
        let err = constraint(ffi::SQLITE_CONSTRAINT_PRIMARYKEY);

        let result = map_tokio_rusqlite_error(err, "Order");

        assert_eq!(
            result,
            RepositoryError::AlreadyExists {
                entity_type: "Order",
                id: "unknown".to_string(),
            }
        );
    }

    #[test]
    fn test_foreign_key_maps_to_invalid_data() {
        let result = map_tokio_rusqlite_error_with_id(
            constraint(ffi::SQLITE_CONSTRAINT_FOREIGNKEY),
            "Subscription",
            "abc",
        );

        assert!(matches!(result, RepositoryError::InvalidData(_)));
    }

    #[test]
    fn test_no_rows_maps_to_not_found_with_id() {
        let err = tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows);

        let result = map_tokio_rusqlite_error_with_id(err, "Payment", "abc-123");

        assert_eq!(
            result,
            RepositoryError::NotFound {
                entity_type: "Payment",
                id: "abc-123".to_string(),
            }
        );
    }

    #[test]
    fn test_other_error_maps_to_query_failed() {
        let err = tokio_rusqlite::Error::Other(Box::new(std::io::Error::other("test error")));

        let result = map_tokio_rusqlite_error(err, "User");

        assert!(matches!(result, RepositoryError::QueryFailed(_)));
    }
}
