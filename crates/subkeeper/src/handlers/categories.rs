//! Category handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use subkeeper_core::domain::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use subkeeper_core::pagination::Page;

use super::query::ListParams;
use crate::{handlers::AppError, state::AppState};

/// List categories (GET /api/categories).
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Category>>, AppError> {
    let page = params.page_request(&state.limits)?;
    Ok(Json(state.categories.list(page).await?))
}

/// Create a category (POST /api/categories).
pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let category = state.categories.create(request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Get a single category by ID (GET /api/categories/{id}).
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(state.categories.get(id).await?))
}

/// Update a category (PUT /api/categories/{id}).
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> Result<Json<Category>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.categories.update(id, request).await?))
}

/// Delete a category (DELETE /api/categories/{id}).
///
/// Fails with 400 while services still reference the category.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
