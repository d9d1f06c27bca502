use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use subkeeper_core::domain::ValidationError;
use subkeeper_core::storage::RepositoryError;

use crate::services::ServiceError;

/// Error returned by every API handler.
///
/// The status is picked by downcasting to the known error types; anything
/// else is a 500. The body is always `{"error": "<message>"}`.
pub struct AppError(pub anyhow::Error);

fn repository_status(error: &RepositoryError) -> StatusCode {
    StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        if let Some(service_error) = self.0.downcast_ref::<ServiceError>() {
            match service_error {
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::Repository(repo_error) => repository_status(repo_error),
            }
        } else if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            repository_status(repo_error)
        } else if self.0.downcast_ref::<ValidationError>().is_some() {
            StatusCode::BAD_REQUEST
        } else if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            rejection.status()
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.0.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %message, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %message, "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
