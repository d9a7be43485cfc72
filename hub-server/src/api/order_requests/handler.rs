//! Order Request API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    Order, OrderRequest, OrderRequestConfirm, OrderRequestCreate, OrderRequestReject,
    OrderRequestStatus, OrderRequestWait, PlaceOrder,
};
use shared::util::now_millis;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order_request;
use crate::ordering::workflow::{self, Decision};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<OrderRequestStatus>,
}

// ==================== Customer ====================

/// POST /api/customer/order-requests - submit the current cart
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OrderRequestCreate>,
) -> AppResult<Json<OrderRequest>> {
    payload.validate()?;
    Ok(Json(workflow::create_request(&state, user.id, &payload, now_millis()).await?))
}

/// GET /api/customer/order-requests?status=
pub async fn customer_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<Vec<OrderRequest>>> {
    Ok(Json(order_request::list_for_customer(state.pool(), user.id, filter.status).await?))
}

/// GET /api/customer/order-requests/{id}
pub async fn customer_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderRequest>> {
    Ok(Json(order_request::get_for_customer(state.pool(), user.id, id).await?))
}

/// POST /api/customer/order-requests/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderRequest>> {
    Ok(Json(workflow::cancel_request(&state, user.id, id).await?))
}

/// POST /api/customer/order-requests/{id}/place - commit to a confirmed request
pub async fn place(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PlaceOrder>,
) -> AppResult<Json<Order>> {
    let order = workflow::place_order(&state, user.id, id, payload.payment_method, now_millis()).await?;
    Ok(Json(order))
}

// ==================== Staff ====================

/// GET /api/staff/order-requests?status=
pub async fn staff_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<Vec<OrderRequest>>> {
    let rows = order_request::list_for_restaurant(state.pool(), user.restaurant_id()?, filter.status).await?;
    Ok(Json(rows))
}

/// GET /api/staff/order-requests/{id}
pub async fn staff_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderRequest>> {
    Ok(Json(order_request::get_for_restaurant(state.pool(), user.restaurant_id()?, id).await?))
}

/// POST /api/staff/order-requests/{id}/confirm
pub async fn confirm(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderRequestConfirm>,
) -> AppResult<Json<OrderRequest>> {
    payload.validate()?;
    let decision = Decision::Confirm { note: payload.note };
    Ok(Json(workflow::respond(&state, user.restaurant_id()?, id, decision, now_millis()).await?))
}

/// POST /api/staff/order-requests/{id}/reject
pub async fn reject(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderRequestReject>,
) -> AppResult<Json<OrderRequest>> {
    payload.validate()?;
    if payload.reason.trim().is_empty() {
        return Err(AppError::validation("reason must not be blank"));
    }
    let decision = Decision::Reject { reason: payload.reason };
    Ok(Json(workflow::respond(&state, user.restaurant_id()?, id, decision, now_millis()).await?))
}

/// POST /api/staff/order-requests/{id}/wait
pub async fn wait(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderRequestWait>,
) -> AppResult<Json<OrderRequest>> {
    payload.validate()?;
    let decision = Decision::Wait {
        minutes: payload.minutes,
        note: payload.note,
    };
    Ok(Json(workflow::respond(&state, user.restaurant_id()?, id, decision, now_millis()).await?))
}
