//! Auth API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/{class}/auth/login | POST | none |
//! | /api/customer/auth/register | POST | none |
//! | /api/{class}/auth/logout | POST | own class |
//! | /api/{class}/auth/me | GET | own class |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use shared::models::ActorKind;

use crate::auth::require_actor;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let public = Router::new()
        .route("/api/admin/auth/login", post(handler::admin_login))
        .route("/api/staff/auth/login", post(handler::staff_login))
        .route("/api/customer/auth/login", post(handler::customer_login))
        .route("/api/customer/auth/register", post(handler::customer_register));

    public
        .merge(session_routes("/api/admin/auth", ActorKind::Admin))
        .merge(session_routes("/api/staff/auth", ActorKind::Staff))
        .merge(session_routes("/api/customer/auth", ActorKind::Customer))
}

fn session_routes(prefix: &str, kind: ActorKind) -> Router<ServerState> {
    let routes = Router::new()
        .route("/logout", post(handler::logout))
        .route("/me", get(handler::me))
        .layer(middleware::from_fn(require_actor(kind)));
    Router::new().nest(prefix, routes)
}
