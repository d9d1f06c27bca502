//! Subscription handlers and the billing total.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use subkeeper_core::billing::BillingTotal;
use subkeeper_core::domain::{
    CreateSubscriptionRequest, SubscriptionView, UpdateSubscriptionRequest,
};
use subkeeper_core::pagination::Page;

use super::query::{ListParams, TotalParams};
use crate::{handlers::AppError, state::AppState};

/// List subscriptions with their service names (GET /api/subscriptions).
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<SubscriptionView>>, AppError> {
    let page = params.page_request(&state.limits)?;
    Ok(Json(state.subscriptions.list(page).await?))
}

/// Create a subscription (POST /api/subscriptions).
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let subscription = state.subscriptions.create(request).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionView>, AppError> {
    Ok(Json(state.subscriptions.get(id).await?))
}

pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateSubscriptionRequest>, JsonRejection>,
) -> Result<Json<SubscriptionView>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.subscriptions.update(id, request).await?))
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.subscriptions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Total price over a month window (GET /api/subscriptions/total).
///
/// `from` and `to` are `MM-YYYY` and both months are included. `user_id` and
/// `service_name` narrow the set of subscriptions; `service_name` must match
/// exactly.
pub async fn subscriptions_total(
    State(state): State<AppState>,
    Query(params): Query<TotalParams>,
) -> Result<Json<BillingTotal>, AppError> {
    let filter = params.into_filter()?;
    Ok(Json(state.subscriptions.total(filter).await?))
}
