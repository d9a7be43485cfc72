//! Order API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Order, OrderStatus, OrderStatusUpdate, PaymentStatusUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order;
use crate::ordering::workflow;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<OrderStatus>,
}

/// GET /api/customer/orders
pub async fn customer_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(order::list_for_customer(state.pool(), user.id).await?))
}

/// GET /api/customer/orders/{id}
pub async fn customer_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(order::get_for_customer(state.pool(), user.id, id).await?))
}

/// POST /api/customer/orders/{id}/cancel - only while `placed`
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(workflow::cancel_order(&state, user.id, id).await?))
}

/// GET /api/staff/orders?status=
pub async fn staff_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(order::list_for_restaurant(state.pool(), user.restaurant_id()?, filter.status).await?))
}

/// GET /api/staff/orders/{id}
pub async fn staff_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(order::get_for_restaurant(state.pool(), user.restaurant_id()?, id).await?))
}

/// PUT /api/staff/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let updated = workflow::update_order_status(&state, user.restaurant_id()?, id, payload.status).await?;
    Ok(Json(updated))
}

/// PUT /api/staff/orders/{id}/payment
pub async fn update_payment(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentStatusUpdate>,
) -> AppResult<Json<Order>> {
    let updated =
        workflow::update_payment_status(&state, user.restaurant_id()?, id, payload.payment_status).await?;
    Ok(Json(updated))
}
