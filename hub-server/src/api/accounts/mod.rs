//! Account API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/admin/admins | GET, POST | admins:manage |
//! | /api/admin/admins/{id} | GET, PUT, DELETE | admins:manage |
//! | /api/admin/customers | GET | customers:read |
//! | /api/admin/customers/{id} | GET | customers:read |
//! | /api/admin/customers/{id}/active | PUT | customers:manage |
//! | /api/staff/members | GET, POST | staff:manage |
//! | /api/staff/members/{id} | GET, PUT, DELETE | staff:manage |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};
use shared::models::ActorKind;

use crate::auth::{require_actor, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/admin", admin_routes())
        .nest("/api/staff/members", staff_routes())
}

fn admin_routes() -> Router<ServerState> {
    let admins = Router::new()
        .route("/admins", get(handler::admin_list).post(handler::admin_create))
        .route(
            "/admins/{id}",
            get(handler::admin_get)
                .put(handler::admin_update)
                .delete(handler::admin_delete),
        )
        .layer(middleware::from_fn(require_permission("admins:manage")));

    let customer_read = Router::new()
        .route("/customers", get(handler::customer_list))
        .route("/customers/{id}", get(handler::customer_get))
        .layer(middleware::from_fn(require_permission("customers:read")));

    let customer_manage = Router::new()
        .route("/customers/{id}/active", put(handler::customer_set_active))
        .layer(middleware::from_fn(require_permission("customers:manage")));

    admins
        .merge(customer_read)
        .merge(customer_manage)
        .layer(middleware::from_fn(require_actor(ActorKind::Admin)))
}

fn staff_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::staff_list).post(handler::staff_create))
        .route(
            "/{id}",
            get(handler::staff_get)
                .put(handler::staff_update)
                .delete(handler::staff_delete),
        )
        .layer(middleware::from_fn(require_permission("staff:manage")))
        .layer(middleware::from_fn(require_actor(ActorKind::Staff)))
}
