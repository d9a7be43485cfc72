//! Order API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/customer/orders | GET | customer |
//! | /api/customer/orders/{id} | GET | customer |
//! | /api/customer/orders/{id}/cancel | POST | customer |
//! | /api/staff/orders | GET | orders:manage |
//! | /api/staff/orders/{id} | GET | orders:manage |
//! | /api/staff/orders/{id}/status | PUT | orders:manage |
//! | /api/staff/orders/{id}/payment | PUT | orders:manage |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use shared::models::ActorKind;

use crate::auth::{require_actor, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/customer/orders", customer_routes())
        .nest("/api/staff/orders", staff_routes())
}

fn customer_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::customer_list))
        .route("/{id}", get(handler::customer_get))
        .route("/{id}/cancel", post(handler::cancel))
        .layer(middleware::from_fn(require_actor(ActorKind::Customer)))
}

fn staff_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::staff_list))
        .route("/{id}", get(handler::staff_get))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/payment", put(handler::update_payment))
        .layer(middleware::from_fn(require_permission("orders:manage")))
        .layer(middleware::from_fn(require_actor(ActorKind::Staff)))
}
