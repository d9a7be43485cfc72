//! Role API module
//!
//! Admin and staff role sets are independent; staff roles are scoped to the
//! caller's restaurant.
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/{admin,staff}/roles | GET, POST | roles:manage |
//! | /api/{admin,staff}/roles/{id} | GET, PUT, DELETE | roles:manage |
//! | /api/{admin,staff}/permissions | GET | roles:manage |

mod handler;

use axum::{Router, middleware, routing::get};
use shared::models::ActorKind;

use crate::auth::{require_actor, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let admin = Router::new()
        .route("/roles", get(handler::admin_list).post(handler::admin_create))
        .route(
            "/roles/{id}",
            get(handler::admin_get)
                .put(handler::admin_update)
                .delete(handler::admin_delete),
        )
        .route("/permissions", get(handler::admin_permissions))
        .layer(middleware::from_fn(require_permission("roles:manage")))
        .layer(middleware::from_fn(require_actor(ActorKind::Admin)));

    let staff = Router::new()
        .route("/roles", get(handler::staff_list).post(handler::staff_create))
        .route(
            "/roles/{id}",
            get(handler::staff_get)
                .put(handler::staff_update)
                .delete(handler::staff_delete),
        )
        .route("/permissions", get(handler::staff_permissions))
        .layer(middleware::from_fn(require_permission("roles:manage")))
        .layer(middleware::from_fn(require_actor(ActorKind::Staff)));

    Router::new()
        .nest("/api/admin", admin)
        .nest("/api/staff", staff)
}
