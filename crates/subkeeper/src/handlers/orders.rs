//! Order handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use subkeeper_core::domain::{Order, CreateOrderRequest, UpdateOrderRequest};
use subkeeper_core::pagination::Page;

use super::query::ListParams;
use crate::{handlers::AppError, state::AppState};

pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Order>>, AppError> {
    let page = params.page_request(&state.limits)?;
    Ok(Json(state.orders.list(page).await?))
}

/// Create an order (POST /api/orders).
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let order = state.orders.create(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.orders.get(id).await?))
}

/// Mark an order paid or unpaid (PUT /api/orders/{id}).
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> Result<Json<Order>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.orders.update(id, request).await?))
}

/// Delete an order (DELETE /api/orders/{id}).
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.orders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
