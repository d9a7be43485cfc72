//! Report API Handlers

use axum::{
    Json,
    extract::{Extension, Query, State},
};
use shared::models::{AdminSummary, RangeQuery, RestaurantSummary};
use shared::util::now_millis;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::report;
use crate::utils::{AppError, AppResult};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// `[from, to)`, defaulting to the last 24 hours
fn resolve_range(query: &RangeQuery, now: i64) -> AppResult<(i64, i64)> {
    let to = query.to.unwrap_or(now);
    let from = query.from.unwrap_or(to.saturating_sub(DAY_MS));
    if from >= to {
        return Err(AppError::validation(format!(
            "from ({from}) must be before to ({to})"
        )));
    }
    Ok((from, to))
}

/// GET /api/admin/reports/summary
pub async fn admin_summary(State(state): State<ServerState>) -> AppResult<Json<AdminSummary>> {
    Ok(Json(report::admin_summary(state.pool()).await?))
}

/// GET /api/staff/reports/summary?from=&to=
pub async fn restaurant_summary(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<RestaurantSummary>> {
    let (from, to) = resolve_range(&query, now_millis())?;
    let summary = report::restaurant_summary(state.pool(), user.restaurant_id()?, from, to).await?;
    Ok(Json(summary))
}
