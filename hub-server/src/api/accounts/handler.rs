//! Account API Handlers
//!
//! Disabling or deleting an account also drops its sessions, so the change
//! takes effect on the next request rather than at token expiry.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{AccountCreate, AccountUpdate, ActorKind, AdminUser, Customer, StaffUser};
use shared::util::normalize_email;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::{admin_user, customer, role, session, staff_user};
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CustomerPage {
    pub items: Vec<Customer>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetActive {
    pub is_active: bool,
}

fn hash_optional(password: Option<&str>) -> AppResult<Option<String>> {
    password.map(hash_password).transpose()
}

async fn revoke_sessions(state: &ServerState, kind: ActorKind, actor_id: i64) -> AppResult<()> {
    let dropped = session::delete_by_actor(state.pool(), kind, actor_id).await?;
    if dropped > 0 {
        security_log!(
            "INFO",
            "sessions_revoked",
            actor = kind.to_string(),
            actor_id = actor_id,
            count = dropped
        );
    }
    Ok(())
}

// ==================== Admins ====================

async fn ensure_admin_role(state: &ServerState, role_id: i64) -> AppResult<()> {
    role::admin_find_by_id(state.pool(), role_id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::RoleNotFound, format!("Role {role_id} not found")))?;
    Ok(())
}

/// GET /api/admin/admins
pub async fn admin_list(State(state): State<ServerState>) -> AppResult<Json<Vec<AdminUser>>> {
    Ok(Json(admin_user::find_all(state.pool()).await?))
}

/// GET /api/admin/admins/{id}
pub async fn admin_get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AdminUser>> {
    let admin = admin_user::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::AdminNotFound, format!("Admin {id} not found")))?;
    Ok(Json(admin))
}

/// POST /api/admin/admins
pub async fn admin_create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AccountCreate>,
) -> AppResult<Json<AdminUser>> {
    payload.validate()?;
    ensure_admin_role(&state, payload.role_id).await?;

    let hash = hash_password(&payload.password)?;
    let created = admin_user::create(
        state.pool(),
        payload.name.trim(),
        &normalize_email(&payload.email),
        &hash,
        payload.role_id,
    )
    .await?;
    tracing::info!(admin_id = created.id, by = user.id, "Admin account created");
    Ok(Json(created))
}

/// PUT /api/admin/admins/{id}
pub async fn admin_update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AccountUpdate>,
) -> AppResult<Json<AdminUser>> {
    payload.validate()?;
    if let Some(role_id) = payload.role_id {
        ensure_admin_role(&state, role_id).await?;
    }
    if id == user.id && payload.is_active == Some(false) {
        return Err(AppError::with_message(
            ErrorCode::CannotDeleteSelf,
            "Cannot disable your own account",
        ));
    }

    let hash = hash_optional(payload.password.as_deref())?;
    let updated = admin_user::update(
        state.pool(),
        id,
        payload.name.as_deref().map(str::trim),
        hash.as_deref(),
        payload.role_id,
        payload.is_active,
    )
    .await?;

    if payload.is_active == Some(false) || hash.is_some() || payload.role_id.is_some() {
        revoke_sessions(&state, ActorKind::Admin, id).await?;
    }
    tracing::info!(admin_id = id, by = user.id, "Admin account updated");
    Ok(Json(updated))
}

/// DELETE /api/admin/admins/{id}
pub async fn admin_delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if id == user.id {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }
    revoke_sessions(&state, ActorKind::Admin, id).await?;
    admin_user::delete(state.pool(), id).await?;
    tracing::info!(admin_id = id, by = user.id, "Admin account deleted");
    Ok(Json(true))
}

// ==================== Customers ====================

/// GET /api/admin/customers?limit=&offset=
pub async fn customer_list(
    State(state): State<ServerState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<CustomerPage>> {
    let limit = page.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = page.offset.unwrap_or(0).max(0);

    let items = customer::find_page(state.pool(), limit, offset).await?;
    let total = customer::count(state.pool()).await?;
    Ok(Json(CustomerPage { items, total }))
}

/// GET /api/admin/customers/{id}
pub async fn customer_get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    let found = customer::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::CustomerNotFound, format!("Customer {id} not found")))?;
    Ok(Json(found))
}

/// PUT /api/admin/customers/{id}/active
pub async fn customer_set_active(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<SetActive>,
) -> AppResult<Json<Customer>> {
    let updated = customer::set_active(state.pool(), id, payload.is_active).await?;
    if !payload.is_active {
        revoke_sessions(&state, ActorKind::Customer, id).await?;
    }
    tracing::info!(customer_id = id, is_active = payload.is_active, by = user.id, "Customer status changed");
    Ok(Json(updated))
}

// ==================== Staff ====================

async fn ensure_staff_role(state: &ServerState, restaurant_id: i64, role_id: i64) -> AppResult<()> {
    role::staff_find_by_id(state.pool(), restaurant_id, role_id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::RoleNotFound, format!("Role {role_id} not found")))?;
    Ok(())
}

/// GET /api/staff/members
pub async fn staff_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<StaffUser>>> {
    Ok(Json(staff_user::find_all(state.pool(), user.restaurant_id()?).await?))
}

/// GET /api/staff/members/{id}
pub async fn staff_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<StaffUser>> {
    let found = staff_user::find_by_id(state.pool(), user.restaurant_id()?, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::StaffNotFound, format!("Staff {id} not found")))?;
    Ok(Json(found))
}

/// POST /api/staff/members
pub async fn staff_create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AccountCreate>,
) -> AppResult<Json<StaffUser>> {
    payload.validate()?;
    let restaurant_id = user.restaurant_id()?;
    ensure_staff_role(&state, restaurant_id, payload.role_id).await?;

    let hash = hash_password(&payload.password)?;
    let created = staff_user::create(
        state.pool(),
        restaurant_id,
        payload.name.trim(),
        &normalize_email(&payload.email),
        &hash,
        payload.role_id,
    )
    .await?;
    tracing::info!(restaurant_id, staff_id = created.id, by = user.id, "Staff account created");
    Ok(Json(created))
}

/// PUT /api/staff/members/{id}
pub async fn staff_update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AccountUpdate>,
) -> AppResult<Json<StaffUser>> {
    payload.validate()?;
    let restaurant_id = user.restaurant_id()?;
    if let Some(role_id) = payload.role_id {
        ensure_staff_role(&state, restaurant_id, role_id).await?;
    }
    if id == user.id && payload.is_active == Some(false) {
        return Err(AppError::with_message(
            ErrorCode::CannotDeleteSelf,
            "Cannot disable your own account",
        ));
    }

    let hash = hash_optional(payload.password.as_deref())?;
    let updated = staff_user::update(
        state.pool(),
        restaurant_id,
        id,
        payload.name.as_deref().map(str::trim),
        hash.as_deref(),
        payload.role_id,
        payload.is_active,
    )
    .await?;

    if payload.is_active == Some(false) || hash.is_some() || payload.role_id.is_some() {
        revoke_sessions(&state, ActorKind::Staff, id).await?;
    }
    Ok(Json(updated))
}

/// DELETE /api/staff/members/{id}
pub async fn staff_delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if id == user.id {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }
    let restaurant_id = user.restaurant_id()?;
    // Scope check before touching sessions of another restaurant's staff
    staff_user::find_by_id(state.pool(), restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::StaffNotFound, format!("Staff {id} not found")))?;

    revoke_sessions(&state, ActorKind::Staff, id).await?;
    staff_user::delete(state.pool(), restaurant_id, id).await?;
    tracing::info!(restaurant_id, staff_id = id, by = user.id, "Staff account deleted");
    Ok(Json(true))
}
