//! User handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use subkeeper_core::domain::{CreateUserRequest, UpdateUserRequest, User};
use subkeeper_core::pagination::Page;

use super::query::{EmailParams, ListParams};
use crate::{handlers::AppError, state::AppState};

/// List users (GET /api/users).
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<User>>, AppError> {
    let page = params.page_request(&state.limits)?;
    Ok(Json(state.users.list(page).await?))
}

/// Look up a user by email (GET /api/users/email?email=).
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
) -> Result<Json<User>, AppError> {
    let email = params.email()?;
    Ok(Json(state.users.get_by_email(email).await?))
}

/// Create a user (POST /api/users).
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let user = state.users.create(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a single user by ID (GET /api/users/{id}).
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get(id).await?))
}

/// Update a user (PUT /api/users/{id}).
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.users.update(id, request).await?))
}

/// Delete a user (DELETE /api/users/{id}).
///
/// Rejected while the user still owns subscriptions or orders.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
