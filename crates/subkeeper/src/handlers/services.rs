//! Handlers for the service catalog.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use subkeeper_core::domain::{Service, CreateServiceRequest, UpdateServiceRequest};
use subkeeper_core::pagination::Page;

use super::query::ListParams;
use crate::{handlers::AppError, state::AppState};

/// List services (GET /api/services).
pub async fn list_services(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Service>>, AppError> {
    let page = params.page_request(&state.limits)?;
    Ok(Json(state.catalog.list(page).await?))
}

/// Create a service (POST /api/services).
///
/// The referenced category must exist.
pub async fn create_service(
    State(state): State<AppState>,
    payload: Result<Json<CreateServiceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let service = state.catalog.create(request).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// Get a single service by ID (GET /api/services/{id}).
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, AppError> {
    Ok(Json(state.catalog.get(id).await?))
}

/// Update a service (PUT /api/services/{id}).
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateServiceRequest>, JsonRejection>,
) -> Result<Json<Service>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.catalog.update(id, request).await?))
}

/// Delete a service (DELETE /api/services/{id}).
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
