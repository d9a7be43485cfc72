//! Coupon API Handlers
//!
//! The caller decides the scope: admins see platform coupons
//! (`restaurant_id` NULL), staff see their restaurant's.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use shared::models::{ActorKind, Coupon, CouponCreate, CouponUpdate};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::coupon;
use crate::utils::AppResult;

fn scope(user: &CurrentUser) -> AppResult<Option<i64>> {
    match user.kind {
        ActorKind::Staff => user.restaurant_id().map(Some),
        _ => Ok(None),
    }
}

/// GET /api/{admin,staff}/coupons
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Coupon>>> {
    Ok(Json(coupon::list(state.pool(), scope(&user)?).await?))
}

/// GET /api/{admin,staff}/coupons/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Coupon>> {
    Ok(Json(coupon::get(state.pool(), scope(&user)?, id).await?))
}

/// POST /api/{admin,staff}/coupons
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CouponCreate>,
) -> AppResult<Json<Coupon>> {
    payload.validate()?;
    let scope = scope(&user)?;
    let created = coupon::create(state.pool(), scope, &payload).await?;
    tracing::info!(
        coupon_id = created.id,
        code = %created.code,
        restaurant_id = ?scope,
        by = user.id,
        "Coupon created"
    );
    Ok(Json(created))
}

/// PUT /api/{admin,staff}/coupons/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CouponUpdate>,
) -> AppResult<Json<Coupon>> {
    payload.validate()?;
    Ok(Json(coupon::update(state.pool(), scope(&user)?, id, &payload).await?))
}

/// DELETE /api/{admin,staff}/coupons/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    coupon::delete(state.pool(), scope(&user)?, id).await?;
    tracing::info!(coupon_id = id, by = user.id, "Coupon deleted");
    Ok(Json(true))
}
