//! Restaurant API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;
use shared::live::{LiveEventKind, room};
use shared::models::{
    AlongRouteQuery, MenuTree, NearbyQuery, Restaurant, RestaurantMatch, RestaurantRegister,
    RestaurantRegistered, RestaurantReject, RestaurantStatus, RestaurantUpdate,
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::{menu, restaurant, session};
use crate::geo;
use crate::security_log;
use crate::utils::time::validate_hhmm;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<RestaurantStatus>,
}

// ==================== Public ====================

/// POST /api/public/restaurants/register
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RestaurantRegister>,
) -> AppResult<Json<RestaurantRegistered>> {
    payload.validate()?;
    validate_hhmm("opening_time", &payload.opening_time)?;
    validate_hhmm("closing_time", &payload.closing_time)?;

    let hash = hash_password(&payload.owner_password)?;
    let registered = restaurant::register(state.pool(), &payload, &hash).await?;
    tracing::info!(
        restaurant_id = registered.restaurant.id,
        owner_id = registered.owner_id,
        "Restaurant registered, awaiting approval"
    );

    state.live.emit(
        room::ADMIN,
        LiveEventKind::RestaurantRegistered,
        &registered.restaurant,
    );
    Ok(Json(registered))
}

/// GET /api/public/restaurants
pub async fn list_approved(State(state): State<ServerState>) -> AppResult<Json<Vec<Restaurant>>> {
    let restaurants = restaurant::find_all(state.pool(), Some(RestaurantStatus::Approved)).await?;
    Ok(Json(restaurants))
}

/// GET /api/public/restaurants/{id}
pub async fn get_approved(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    Ok(Json(restaurant::get_approved(state.pool(), id).await?))
}

/// GET /api/public/restaurants/{id}/menu - available entries only
pub async fn public_menu(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuTree>> {
    restaurant::get_approved(state.pool(), id).await?;
    Ok(Json(menu::menu_tree(state.pool(), id, true).await?))
}

/// GET /api/public/restaurants/along-route
pub async fn along_route(
    State(state): State<ServerState>,
    Query(query): Query<AlongRouteQuery>,
) -> AppResult<Json<Vec<RestaurantMatch>>> {
    Ok(Json(geo::along_route(state.pool(), &query).await?))
}

/// GET /api/public/restaurants/nearby
pub async fn nearby(
    State(state): State<ServerState>,
    Query(query): Query<NearbyQuery>,
) -> AppResult<Json<Vec<RestaurantMatch>>> {
    Ok(Json(geo::nearby(state.pool(), &query).await?))
}

// ==================== Admin ====================

/// GET /api/admin/restaurants?status=
pub async fn admin_list(
    State(state): State<ServerState>,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<Vec<Restaurant>>> {
    Ok(Json(restaurant::find_all(state.pool(), filter.status).await?))
}

/// GET /api/admin/restaurants/{id}
pub async fn admin_get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    Ok(Json(restaurant::get(state.pool(), id).await?))
}

async fn moderate(
    state: &ServerState,
    reviewer: &CurrentUser,
    id: i64,
    next: RestaurantStatus,
    reason: Option<&str>,
) -> AppResult<Restaurant> {
    let updated = restaurant::set_status(state.pool(), id, next, reason, reviewer.id).await?;
    tracing::info!(
        restaurant_id = id,
        reviewer_id = reviewer.id,
        status = next.as_str(),
        "Restaurant moderated"
    );

    // Staff of a suspended or rejected restaurant lose access immediately
    if next != RestaurantStatus::Approved {
        let dropped = session::delete_by_restaurant(state.pool(), id).await?;
        if dropped > 0 {
            security_log!(
                "INFO",
                "sessions_revoked",
                restaurant_id = id,
                status = next.as_str(),
                count = dropped
            );
        }
    }

    state
        .live
        .emit(room::ADMIN, LiveEventKind::RestaurantStatusChanged, &updated);
    state.live.emit(
        room::restaurant(id),
        LiveEventKind::RestaurantStatusChanged,
        &updated,
    );
    Ok(updated)
}

/// POST /api/admin/restaurants/{id}/approve
pub async fn approve(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    Ok(Json(moderate(&state, &user, id, RestaurantStatus::Approved, None).await?))
}

/// POST /api/admin/restaurants/{id}/reject
pub async fn reject(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RestaurantReject>,
) -> AppResult<Json<Restaurant>> {
    payload.validate()?;
    let reason = payload.reason.trim();
    if reason.is_empty() {
        return Err(AppError::validation("reason must not be blank"));
    }
    Ok(Json(
        moderate(&state, &user, id, RestaurantStatus::Rejected, Some(reason)).await?,
    ))
}

/// POST /api/admin/restaurants/{id}/suspend
pub async fn suspend(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    Ok(Json(moderate(&state, &user, id, RestaurantStatus::Suspended, None).await?))
}

/// POST /api/admin/restaurants/{id}/reinstate
pub async fn reinstate(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    let current = restaurant::get(state.pool(), id).await?;
    if current.status != RestaurantStatus::Suspended {
        return Err(AppError::invalid_transition(
            "restaurant",
            current.status.as_str(),
            RestaurantStatus::Approved.as_str(),
        ));
    }
    Ok(Json(moderate(&state, &user, id, RestaurantStatus::Approved, None).await?))
}

// ==================== Staff ====================

/// GET /api/staff/restaurant
pub async fn own(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Restaurant>> {
    Ok(Json(restaurant::get(state.pool(), user.restaurant_id()?).await?))
}

/// PUT /api/staff/restaurant
pub async fn update_own(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RestaurantUpdate>,
) -> AppResult<Json<Restaurant>> {
    payload.validate()?;
    if let Some(t) = &payload.opening_time {
        validate_hhmm("opening_time", t)?;
    }
    if let Some(t) = &payload.closing_time {
        validate_hhmm("closing_time", t)?;
    }

    let restaurant_id = user.restaurant_id()?;
    let updated = restaurant::update(state.pool(), restaurant_id, &payload).await?;
    tracing::info!(restaurant_id, staff_id = user.id, "Restaurant profile updated");
    Ok(Json(updated))
}
