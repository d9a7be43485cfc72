//! Authentication Handlers
//!
//! Login for the three actor classes, customer registration, logout and
//! `me`. Unknown email and wrong password produce the same error.

use axum::{Extension, Json, extract::State, http::HeaderMap};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ActorKind, CustomerRegister, LoginRequest, LoginResponse, RestaurantStatus, UserInfo};
use shared::util::normalize_email;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::rate_limit::client_ip;
use crate::auth::session::user_info;
use crate::auth::{CurrentUser, Principal, close_session, open_session};
use crate::core::ServerState;
use crate::db::repository::{admin_user, customer, restaurant, role, staff_user};
use crate::security_log;

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.chars().take(255).collect())
}

/// Rate limit key of a login attempt
fn attempt_key(kind: ActorKind, headers: &HeaderMap, email: &str) -> String {
    format!("{}:{}:{}", kind, client_ip(headers), email)
}

fn check_rate(state: &ServerState, key: &str) -> AppResult<()> {
    if !state.login_limiter.check(key) {
        security_log!("WARN", "login_rate_limited", key = key.to_string());
        return Err(AppError::new(ErrorCode::TooManyRequests));
    }
    Ok(())
}

fn login_failed(kind: ActorKind, email: &str, reason: &str) -> AppError {
    security_log!(
        "WARN",
        "login_failed",
        actor = kind.to_string(),
        email = email.to_string(),
        reason = reason.to_string()
    );
    AppError::invalid_credentials()
}

fn disabled(kind: ActorKind, email: &str) -> AppError {
    security_log!("WARN", "login_disabled", actor = kind.to_string(), email = email.to_string());
    AppError::new(ErrorCode::AccountDisabled)
}

/// POST /api/admin/auth/login
pub async fn admin_login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;
    let email = normalize_email(&req.email);
    let key = attempt_key(ActorKind::Admin, &headers, &email);
    check_rate(&state, &key)?;

    let admin = admin_user::find_by_email(state.pool(), &email)
        .await?
        .ok_or_else(|| login_failed(ActorKind::Admin, &email, "unknown_email"))?;
    if !verify_password(&req.password, &admin.password_hash) {
        return Err(login_failed(ActorKind::Admin, &email, "wrong_password"));
    }
    if !admin.is_active {
        return Err(disabled(ActorKind::Admin, &email));
    }

    let role = role::admin_find_by_id(state.pool(), admin.role_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("Role {} of admin {} missing", admin.role_id, admin.id)))?;

    let principal = Principal {
        user: CurrentUser {
            id: admin.id,
            name: admin.name,
            kind: ActorKind::Admin,
            restaurant_id: None,
            role: role.name,
            permissions: role.permissions,
            session_id: String::new(),
        },
        email: admin.email,
    };
    let response = open_session(&state, principal, user_agent(&headers)).await?;
    state.login_limiter.reset(&key);
    Ok(Json(response))
}

/// POST /api/staff/auth/login
pub async fn staff_login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;
    let email = normalize_email(&req.email);
    let key = attempt_key(ActorKind::Staff, &headers, &email);
    check_rate(&state, &key)?;

    let staff = staff_user::find_by_email(state.pool(), &email)
        .await?
        .ok_or_else(|| login_failed(ActorKind::Staff, &email, "unknown_email"))?;
    if !verify_password(&req.password, &staff.password_hash) {
        return Err(login_failed(ActorKind::Staff, &email, "wrong_password"));
    }
    if !staff.is_active {
        return Err(disabled(ActorKind::Staff, &email));
    }

    let restaurant = restaurant::get(state.pool(), staff.restaurant_id).await?;
    if restaurant.status != RestaurantStatus::Approved {
        security_log!(
            "WARN",
            "login_restaurant_not_approved",
            email = email.clone(),
            restaurant_id = restaurant.id,
            status = restaurant.status.as_str()
        );
        return Err(AppError::with_message(
            ErrorCode::RestaurantNotApproved,
            format!("Restaurant is {}", restaurant.status.as_str()),
        ));
    }

    let role = role::staff_find_by_id(state.pool(), staff.restaurant_id, staff.role_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("Role {} of staff {} missing", staff.role_id, staff.id)))?;

    let principal = Principal {
        user: CurrentUser {
            id: staff.id,
            name: staff.name,
            kind: ActorKind::Staff,
            restaurant_id: Some(staff.restaurant_id),
            role: role.name,
            permissions: role.permissions,
            session_id: String::new(),
        },
        email: staff.email,
    };
    let response = open_session(&state, principal, user_agent(&headers)).await?;
    state.login_limiter.reset(&key);
    Ok(Json(response))
}

fn customer_principal(c: shared::models::Customer) -> Principal {
    Principal {
        user: CurrentUser {
            id: c.id,
            name: c.name,
            kind: ActorKind::Customer,
            restaurant_id: None,
            role: ActorKind::Customer.as_str().to_string(),
            permissions: vec![],
            session_id: String::new(),
        },
        email: c.email,
    }
}

/// POST /api/customer/auth/login
pub async fn customer_login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;
    let email = normalize_email(&req.email);
    let key = attempt_key(ActorKind::Customer, &headers, &email);
    check_rate(&state, &key)?;

    let found = customer::find_by_email(state.pool(), &email)
        .await?
        .ok_or_else(|| login_failed(ActorKind::Customer, &email, "unknown_email"))?;
    if !verify_password(&req.password, &found.password_hash) {
        return Err(login_failed(ActorKind::Customer, &email, "wrong_password"));
    }
    if !found.is_active {
        return Err(disabled(ActorKind::Customer, &email));
    }

    let response = open_session(&state, customer_principal(found), user_agent(&headers)).await?;
    state.login_limiter.reset(&key);
    Ok(Json(response))
}

/// POST /api/customer/auth/register - create an account and log in
pub async fn customer_register(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<CustomerRegister>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;
    let email = normalize_email(&req.email);
    let hash = hash_password(&req.password)?;

    let created = customer::create(
        state.pool(),
        req.name.trim(),
        &email,
        req.phone.as_deref(),
        &hash,
    )
    .await?;
    tracing::info!(customer_id = created.id, "Customer registered");

    let response = open_session(&state, customer_principal(created), user_agent(&headers)).await?;
    Ok(Json(response))
}

/// POST /api/{class}/auth/logout
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<bool>> {
    close_session(&state, &user).await?;
    Ok(Json(true))
}

/// GET /api/{class}/auth/me
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UserInfo>> {
    let pool = state.pool();
    let email = match user.kind {
        ActorKind::Admin => admin_user::find_by_id(pool, user.id).await?.map(|a| a.email),
        ActorKind::Staff => staff_user::find_by_id(pool, user.restaurant_id()?, user.id)
            .await?
            .map(|s| s.email),
        ActorKind::Customer => customer::find_by_id(pool, user.id).await?.map(|c| c.email),
    }
    .ok_or_else(|| AppError::new(ErrorCode::SessionExpired))?;

    Ok(Json(user_info(&user, email)))
}
