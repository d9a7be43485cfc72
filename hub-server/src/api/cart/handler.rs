//! Cart API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use shared::models::{ApplyCoupon, CartLineAdd, CartLineUpdate, CartView};
use shared::util::now_millis;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::ordering::cart;
use crate::utils::AppResult;

/// GET /api/customer/cart
pub async fn get_cart(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<CartView>> {
    Ok(Json(cart::view(state.pool(), user.id, now_millis()).await?))
}

/// POST /api/customer/cart/lines
pub async fn add_line(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CartLineAdd>,
) -> AppResult<Json<CartView>> {
    payload.validate()?;
    Ok(Json(cart::add_line(state.pool(), user.id, &payload, now_millis()).await?))
}

/// PUT /api/customer/cart/lines/{line_id}
pub async fn update_line(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(line_id): Path<i64>,
    Json(payload): Json<CartLineUpdate>,
) -> AppResult<Json<CartView>> {
    payload.validate()?;
    let view = cart::update_quantity(state.pool(), user.id, line_id, payload.quantity, now_millis()).await?;
    Ok(Json(view))
}

/// DELETE /api/customer/cart/lines/{line_id}
pub async fn remove_line(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(line_id): Path<i64>,
) -> AppResult<Json<CartView>> {
    Ok(Json(cart::remove_line(state.pool(), user.id, line_id, now_millis()).await?))
}

/// DELETE /api/customer/cart
pub async fn clear(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<CartView>> {
    Ok(Json(cart::clear(state.pool(), user.id).await?))
}

/// POST /api/customer/cart/coupon
pub async fn apply_coupon(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ApplyCoupon>,
) -> AppResult<Json<CartView>> {
    payload.validate()?;
    let view = cart::apply_coupon(state.pool(), user.id, &payload.code, now_millis()).await?;
    Ok(Json(view))
}

/// DELETE /api/customer/cart/coupon
pub async fn remove_coupon(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<CartView>> {
    Ok(Json(cart::remove_coupon(state.pool(), user.id, now_millis()).await?))
}
