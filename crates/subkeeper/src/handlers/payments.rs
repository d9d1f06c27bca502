//! Payment handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use subkeeper_core::domain::{Payment, CreatePaymentRequest, UpdatePaymentRequest};
use subkeeper_core::pagination::Page;

use super::query::ListParams;
use crate::{handlers::AppError, state::AppState};

/// List payments (GET /api/payments).
pub async fn list_payments(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Payment>>, AppError> {
    let page = params.page_request(&state.limits)?;
    Ok(Json(state.payments.list(page).await?))
}

/// Record a payment (POST /api/payments).
///
/// `paid_at` defaults to the time of recording and the currency code is
/// stored upper-cased.
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let payment = state.payments.create(request).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Get a single payment by ID (GET /api/payments/{id}).
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, AppError> {
    Ok(Json(state.payments.get(id).await?))
}

/// Update a payment (PUT /api/payments/{id}).
pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdatePaymentRequest>, JsonRejection>,
) -> Result<Json<Payment>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.payments.update(id, request).await?))
}

/// Delete a payment (DELETE /api/payments/{id}).
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.payments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
