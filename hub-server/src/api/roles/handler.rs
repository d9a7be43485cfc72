//! Role API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use shared::models::{ActorKind, Permission, Role, RoleCreate, RoleUpdate};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::permissions::{ADMIN_PERMISSIONS, STAFF_PERMISSIONS};
use crate::core::ServerState;
use crate::db::repository::{role, session};
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};

fn role_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::RoleNotFound, format!("Role {id} not found"))
}

fn catalogue(entries: &[(&str, &str)]) -> Vec<Permission> {
    entries
        .iter()
        .map(|(code, description)| Permission {
            code: code.to_string(),
            description: description.to_string(),
        })
        .collect()
}

/// Holders of an edited role sign in again so their tokens carry the new
/// permission set
async fn revoke_role_sessions(state: &ServerState, kind: ActorKind, role_id: i64) -> AppResult<()> {
    let dropped = session::delete_by_role(state.pool(), kind, role_id).await?;
    if dropped > 0 {
        security_log!(
            "INFO",
            "sessions_revoked",
            actor = kind.to_string(),
            role_id = role_id,
            count = dropped
        );
    }
    Ok(())
}

// ==================== Admin ====================

/// GET /api/admin/roles
pub async fn admin_list(State(state): State<ServerState>) -> AppResult<Json<Vec<Role>>> {
    Ok(Json(role::admin_find_all(state.pool()).await?))
}

/// GET /api/admin/roles/{id}
pub async fn admin_get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Role>> {
    let found = role::admin_find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| role_not_found(id))?;
    Ok(Json(found))
}

/// POST /api/admin/roles
pub async fn admin_create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RoleCreate>,
) -> AppResult<Json<Role>> {
    payload.validate()?;
    let created = role::admin_create(state.pool(), &payload).await?;
    tracing::info!(role_id = created.id, admin_id = user.id, "Admin role created");
    Ok(Json(created))
}

/// PUT /api/admin/roles/{id}
pub async fn admin_update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<Role>> {
    payload.validate()?;
    let updated = role::admin_update(state.pool(), id, &payload).await?;
    revoke_role_sessions(&state, ActorKind::Admin, id).await?;
    tracing::info!(role_id = id, admin_id = user.id, "Admin role updated");
    Ok(Json(updated))
}

/// DELETE /api/admin/roles/{id}
pub async fn admin_delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    role::admin_delete(state.pool(), id).await?;
    tracing::info!(role_id = id, admin_id = user.id, "Admin role deleted");
    Ok(Json(true))
}

/// GET /api/admin/permissions
pub async fn admin_permissions() -> Json<Vec<Permission>> {
    Json(catalogue(ADMIN_PERMISSIONS))
}

// ==================== Staff ====================

/// GET /api/staff/roles
pub async fn staff_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Role>>> {
    Ok(Json(role::staff_find_all(state.pool(), user.restaurant_id()?).await?))
}

/// GET /api/staff/roles/{id}
pub async fn staff_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Role>> {
    let found = role::staff_find_by_id(state.pool(), user.restaurant_id()?, id)
        .await?
        .ok_or_else(|| role_not_found(id))?;
    Ok(Json(found))
}

/// POST /api/staff/roles
pub async fn staff_create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RoleCreate>,
) -> AppResult<Json<Role>> {
    payload.validate()?;
    let restaurant_id = user.restaurant_id()?;
    let created = role::staff_create(state.pool(), restaurant_id, &payload).await?;
    tracing::info!(restaurant_id, role_id = created.id, staff_id = user.id, "Staff role created");
    Ok(Json(created))
}

/// PUT /api/staff/roles/{id}
pub async fn staff_update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<Role>> {
    payload.validate()?;
    let restaurant_id = user.restaurant_id()?;
    let updated = role::staff_update(state.pool(), restaurant_id, id, &payload).await?;
    revoke_role_sessions(&state, ActorKind::Staff, id).await?;
    tracing::info!(restaurant_id, role_id = id, staff_id = user.id, "Staff role updated");
    Ok(Json(updated))
}

/// DELETE /api/staff/roles/{id}
pub async fn staff_delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let restaurant_id = user.restaurant_id()?;
    role::staff_delete(state.pool(), restaurant_id, id).await?;
    tracing::info!(restaurant_id, role_id = id, staff_id = user.id, "Staff role deleted");
    Ok(Json(true))
}

/// GET /api/staff/permissions
pub async fn staff_permissions() -> Json<Vec<Permission>> {
    Json(catalogue(STAFF_PERMISSIONS))
}
