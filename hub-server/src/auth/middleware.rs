//! Authentication middleware
//!
//! Axum middleware for bearer-token authentication and authorization.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::models::ActorKind;
use std::future::Future;
use std::pin::Pin;

use super::{CurrentUser, JwtService, authenticate_token};
use crate::core::ServerState;
use crate::security_log;
use shared::AppError;

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// Paths reachable without a token
///
/// - everything under `/api/public/`
/// - the login endpoint of each actor class
/// - customer self-registration
pub fn is_public_path(path: &str) -> bool {
    path.starts_with("/api/public/")
        || path.ends_with("/auth/login")
        || path == "/api/customer/auth/register"
}

/// Authentication middleware
///
/// Extracts the token from `Authorization: Bearer <token>`, checks the
/// signature and the backing session, then injects [`CurrentUser`] into the
/// request extensions. `OPTIONS`, non-API paths and public paths pass
/// through untouched.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || is_public_path(path)
    {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = req.uri().to_string());
            return Err(AppError::not_authenticated());
        }
    };

    match authenticate_token(&state, token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                code = e.code.code(),
                uri = req.uri().to_string()
            );
            Err(e)
        }
    }
}

/// Actor-class guard for a route tree
///
/// A token issued to one actor class is rejected with `ActorMismatch` on
/// another class's routes.
pub fn require_actor(kind: ActorKind) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if user.kind != kind {
                security_log!(
                    "WARN",
                    "actor_mismatch",
                    actor = user.kind.to_string(),
                    actor_id = user.id,
                    expected = kind.to_string()
                );
                return Err(AppError::actor_mismatch(kind.as_str()));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Permission guard
///
/// Supports `module:*` wildcards and `all`.
///
/// ```ignore
/// Router::new()
///     .route("/menu/items", post(handler::create))
///     .layer(middleware::from_fn(require_permission("menu:manage")));
/// ```
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    actor = user.kind.to_string(),
                    actor_id = user.id,
                    required_permission = permission
                );
                return Err(AppError::permission_denied(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths() {
        assert!(is_public_path("/api/public/restaurants"));
        assert!(is_public_path("/api/staff/auth/login"));
        assert!(is_public_path("/api/customer/auth/register"));
        assert!(!is_public_path("/api/customer/cart"));
        assert!(!is_public_path("/api/admin/auth/me"));
    }
}
